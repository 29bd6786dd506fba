//! Materialize catalog views for external algorithm runtimes

use super::catalog::{Orientation, ProjectionCatalog, ProjectionSpec};
use crate::error::{PipelineError, PipelineResult};
use crate::graph::{GraphStore, Label, NodeId, NodeKey, PropertyValue};
use rustc_hash::FxHashMap;
use salesgraph_view::GraphView;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Build the CSR view of one projection.
///
/// Nodes are taken label by label in declaration order, each label ordered by
/// key. Edges whose endpoints fall outside the view are left out.
pub fn build_view(store: &GraphStore, spec: &ProjectionSpec) -> GraphView {
    // 1. Collect nodes
    let mut index_to_node: Vec<u64> = Vec::new();
    let mut node_to_index: FxHashMap<NodeId, usize> = FxHashMap::default();
    for label in &spec.labels {
        for node in store.get_nodes_by_label(label) {
            if !node_to_index.contains_key(&node.id) {
                node_to_index.insert(node.id, index_to_node.len());
                index_to_node.push(node.id.as_u64());
            }
        }
    }

    // 2. Adjacency lists per relationship
    let mut outgoing: Vec<Vec<(usize, f64)>> = vec![Vec::new(); index_to_node.len()];
    for rel in &spec.relationships {
        for edge in store.get_edges_by_type(&rel.edge_type) {
            let (Some(&u), Some(&v)) = (
                node_to_index.get(&edge.source),
                node_to_index.get(&edge.target),
            ) else {
                continue;
            };
            let weight = match &rel.weight {
                Some(w) => edge
                    .get_property(&w.property)
                    .and_then(PropertyValue::as_number)
                    .unwrap_or(w.default_value),
                None => 1.0,
            };
            match rel.orientation {
                Orientation::Natural => outgoing[u].push((v, weight)),
                Orientation::Reverse => outgoing[v].push((u, weight)),
                Orientation::Undirected => {
                    outgoing[u].push((v, weight));
                    outgoing[v].push((u, weight));
                }
            }
        }
    }

    // 3. Convert to CSR
    GraphView::from_adjacency_list(index_to_node, outgoing, spec.is_weighted())
}

/// A view node identified by its natural identity
#[derive(Debug, Clone, Serialize)]
pub struct ViewNode {
    pub label: Label,
    pub key: NodeKey,
}

/// One view as written to disk
#[derive(Debug, Serialize)]
pub struct ViewExport<'a> {
    pub spec: &'a ProjectionSpec,
    /// Natural identity of each dense index
    pub nodes: Vec<ViewNode>,
    pub view: GraphView,
}

impl<'a> ViewExport<'a> {
    pub fn build(store: &GraphStore, spec: &'a ProjectionSpec) -> Self {
        let view = build_view(store, spec);
        let nodes = view
            .index_to_node
            .iter()
            .filter_map(|&id| store.get_node(NodeId::new(id)))
            .map(|node| ViewNode {
                label: node.label.clone(),
                key: node.key.clone(),
            })
            .collect();
        Self { spec, nodes, view }
    }
}

/// Per-view summary of an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedView {
    pub name: String,
    pub nodes: usize,
    pub edges: usize,
    pub path: PathBuf,
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> PipelineResult<()> {
    let json = serde_json::to_vec_pretty(value).map_err(|e| PipelineError::Export {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    fs::write(path, json).map_err(|e| PipelineError::Export {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Write `catalog.json` plus one `<view>.json` per view into `dir`
pub fn export_catalog(
    store: &GraphStore,
    catalog: &ProjectionCatalog,
    dir: &Path,
) -> PipelineResult<Vec<ExportedView>> {
    fs::create_dir_all(dir).map_err(|e| PipelineError::Export {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;
    write_json(&dir.join("catalog.json"), catalog)?;

    let mut exported = Vec::with_capacity(catalog.len());
    for spec in catalog.iter() {
        let export = ViewExport::build(store, spec);
        let path = dir.join(format!("{}.json", spec.name));
        write_json(&path, &export)?;

        info!(
            "Exported view {} ({} nodes, {} adjacencies) to {}",
            spec.name,
            export.view.node_count,
            export.view.edge_count(),
            path.display()
        );
        exported.push(ExportedView {
            name: spec.name.clone(),
            nodes: export.view.node_count,
            edges: export.view.edge_count(),
            path,
        });
    }
    Ok(exported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PropertyMap;
    use tempfile::TempDir;

    /// Products 1, 2, 3 with 1-2 weighted and 2-3 unweighted
    fn product_store() -> GraphStore {
        let mut store = GraphStore::new();
        let ids: Vec<NodeId> = [1, 2, 3]
            .into_iter()
            .map(|key| store.upsert_node("Product", NodeKey::Int(key), PropertyMap::new()).0)
            .collect();
        let weighted = PropertyMap::from([("weight".to_string(), PropertyValue::Float(4.0))]);
        store.upsert_edge(ids[0], ids[1], "COMMONLY_SOLD_BY", weighted).unwrap();
        store.upsert_edge(ids[1], ids[2], "COMMONLY_SOLD_BY", PropertyMap::new()).unwrap();
        store
    }

    #[test]
    fn test_undirected_doubles_and_defaults_weight() {
        let store = product_store();
        let catalog = ProjectionCatalog::standard();
        let view = build_view(&store, catalog.get("product-graph").unwrap());

        assert_eq!(view.node_count, 3);
        assert_eq!(view.edge_count(), 4);
        assert_eq!(view.successors(1), &[0, 2]);
        assert_eq!(view.weights(1), Some(&[4.0, 1.0][..]));
    }

    #[test]
    fn test_natural_and_reverse() {
        let store = product_store();
        let natural = ProjectionSpec::new("n")
            .with_label("Product")
            .with_relationship("COMMONLY_SOLD_BY", Orientation::Natural);
        let reverse = ProjectionSpec::new("r")
            .with_label("Product")
            .with_relationship("COMMONLY_SOLD_BY", Orientation::Reverse);

        let view = build_view(&store, &natural);
        assert_eq!(view.edge_count(), 2);
        assert_eq!(view.successors(0), &[1]);
        assert!(view.weights.is_none());

        let view = build_view(&store, &reverse);
        assert_eq!(view.successors(0), &[] as &[usize]);
        assert_eq!(view.successors(2), &[1]);
    }

    #[test]
    fn test_edges_leaving_the_view_are_dropped() {
        let mut store = product_store();
        let (reseller, _) = store.upsert_node("Reseller", NodeKey::Int(9), PropertyMap::new());
        let product = store.node_id(&Label::new("Product"), &NodeKey::Int(1)).unwrap();
        store.upsert_edge(reseller, product, "SOLD", PropertyMap::new()).unwrap();

        let spec = ProjectionSpec::new("only-products")
            .with_label("Product")
            .with_relationship("SOLD", Orientation::Undirected);
        let view = build_view(&store, &spec);
        assert_eq!(view.node_count, 3);
        assert_eq!(view.edge_count(), 0);
    }

    #[test]
    fn test_export_writes_catalog_and_views() {
        let store = product_store();
        let dir = TempDir::new().unwrap();
        let exported = export_catalog(&store, &ProjectionCatalog::standard(), dir.path()).unwrap();

        assert_eq!(exported.len(), 3);
        assert!(dir.path().join("catalog.json").exists());

        let raw = fs::read_to_string(dir.path().join("product-graph.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["view"]["node_count"], 3);
        assert_eq!(json["nodes"][0]["key"], 1);
        assert_eq!(json["nodes"][0]["label"], "Product");
    }
}
