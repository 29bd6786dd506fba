//! Pipeline configuration
//!
//! Resolution order: built-in defaults, then the YAML file named by
//! `SALESGRAPH_CONFIG`, then individual environment overrides.

use crate::error::{PipelineError, PipelineResult};
use crate::projection::{ProjectionCatalog, ProjectionSpec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_ENV: &str = "SALESGRAPH_CONFIG";
pub const DATA_DIR_ENV: &str = "SALESGRAPH_DATA_DIR";
pub const SNAPSHOT_ENV: &str = "SALESGRAPH_SNAPSHOT";
pub const EXPORT_DIR_ENV: &str = "SALESGRAPH_EXPORT_DIR";

/// File names of the input sources, relative to the data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFiles {
    pub salesperson: String,
    pub region: String,
    pub salesperson_region: String,
    pub product: String,
    pub reseller: String,
    pub sales: String,
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self {
            salesperson: "Salesperson.csv".to_string(),
            region: "Region.csv".to_string(),
            salesperson_region: "SalespersonRegion.csv".to_string(),
            product: "Product.csv".to_string(),
            reseller: "Reseller.csv".to_string(),
            sales: "Sales.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub sources: SourceFiles,
    /// Write a store snapshot here after the run
    pub snapshot_path: Option<PathBuf>,
    /// Write the projection views here after a successful run
    pub export_dir: Option<PathBuf>,
    /// Views declared on top of the standard catalog
    pub views: Vec<ProjectionSpec>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            sources: SourceFiles::default(),
            snapshot_path: None,
            export_dir: None,
            views: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Resolve from the process environment
    pub fn load() -> PipelineResult<Self> {
        Self::resolve(|name| std::env::var(name).ok())
    }

    /// Resolve with an explicit variable lookup. Blank values count as unset.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> PipelineResult<Self> {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mut config = match lookup(CONFIG_ENV) {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(lookup);
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        debug!("Read configuration from {}", path.display());
        Self::from_yaml_str(&raw)
            .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_yaml_str(raw: &str) -> PipelineResult<Self> {
        serde_yaml::from_str(raw).map_err(|e| PipelineError::Config(e.to_string()))
    }

    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup(SNAPSHOT_ENV) {
            self.snapshot_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = lookup(EXPORT_DIR_ENV) {
            self.export_dir = Some(PathBuf::from(dir));
        }
    }

    /// Full path of a source file
    pub fn source_path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    /// The standard catalog with configured views declared over it
    pub fn catalog(&self) -> ProjectionCatalog {
        let mut catalog = ProjectionCatalog::standard();
        for view in &self.views {
            catalog.declare(view.clone());
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Orientation;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::resolve(env(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.source_path(&config.sources.sales), PathBuf::from("data/Sales.csv"));
        assert!(config.snapshot_path.is_none());
        assert_eq!(config.catalog().len(), 3);
    }

    #[test]
    fn test_yaml_then_env() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "{}",
            concat!(
                "data_dir: /srv/adventure-works\n",
                "sources:\n",
                "  sales: FactResellerSales.tsv\n",
                "export_dir: /tmp/views",
            )
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = PipelineConfig::resolve(env(&[
            (CONFIG_ENV, path.as_str()),
            (EXPORT_DIR_ENV, "/var/views"),
            (SNAPSHOT_ENV, "  "),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/adventure-works"));
        assert_eq!(config.sources.sales, "FactResellerSales.tsv");
        assert_eq!(config.sources.product, "Product.csv");
        assert_eq!(config.export_dir, Some(PathBuf::from("/var/views")));
        assert!(config.snapshot_path.is_none());
    }

    #[test]
    fn test_configured_view_replaces_standard() {
        let config = PipelineConfig::from_yaml_str(concat!(
            "views:\n",
            "  - name: salesperson-graph\n",
            "    labels: [Person]\n",
            "    relationships:\n",
            "      - edge_type: WORKS_WITH\n",
            "        orientation: UNDIRECTED\n",
        ))
        .unwrap();

        let catalog = config.catalog();
        assert_eq!(catalog.len(), 3);
        let view = catalog.get("salesperson-graph").unwrap();
        assert_eq!(view.relationships[0].orientation, Orientation::Undirected);
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let err = PipelineConfig::from_yaml_str("data_dir: [unterminated").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));

        let missing = env(&[(CONFIG_ENV, "/nonexistent/salesgraph.yaml")]);
        let err = PipelineConfig::resolve(missing).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
