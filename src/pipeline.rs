//! Pipeline orchestration
//!
//! Runs the stages strictly in order against one backend:
//!
//! ```text
//! Clearing -> LoadingEntities(Person, Region, Product, Reseller)
//!          -> LoadingRelationships -> LoadingBipartite
//!          -> DerivingTaxonomy -> Projecting(rule...) -> Done
//! ```
//!
//! The first failing stage stops the run. Nothing is rolled back; rerunning
//! starts again from `Clearing`.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::graph::GraphBackend;
use crate::load::{
    AssignmentRecord, BatchStats, BipartiteBatchLoader, EntityLoader, EntityRecord, LoadStats,
    PersonRecord, ProductRecord, RegionRecord, RelationshipLoader, ResellerRecord, SaleRecord,
    TaxonomyDeriver, TaxonomyStats, TsvSource,
};
use crate::projection::{MonopartiteProjector, ProjectionRule, ProjectionStats};
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info};

/// Entity sources, in load order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    Person,
    Region,
    Product,
    Reseller,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Person,
        EntityKind::Region,
        EntityKind::Product,
        EntityKind::Reseller,
    ];
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Person => "Person",
            EntityKind::Region => "Region",
            EntityKind::Product => "Product",
            EntityKind::Reseller => "Reseller",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PipelineStage {
    Clearing,
    LoadingEntities(EntityKind),
    LoadingRelationships,
    LoadingBipartite,
    DerivingTaxonomy,
    /// Named projection rule
    Projecting(String),
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Clearing => write!(f, "clearing"),
            PipelineStage::LoadingEntities(kind) => write!(f, "loading entities ({})", kind),
            PipelineStage::LoadingRelationships => write!(f, "loading relationships"),
            PipelineStage::LoadingBipartite => write!(f, "loading bipartite batch"),
            PipelineStage::DerivingTaxonomy => write!(f, "deriving taxonomy"),
            PipelineStage::Projecting(rule) => write!(f, "projecting ({})", rule),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running(PipelineStage),
    Done,
    Failed(PipelineStage),
}

/// What a finished stage did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StageOutcome {
    Cleared,
    Entities(LoadStats),
    Relationships(LoadStats),
    Batch(BatchStats),
    Taxonomy(TaxonomyStats),
    Projection(ProjectionStats),
}

impl fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageOutcome::Cleared => write!(f, "store cleared"),
            StageOutcome::Entities(s) | StageOutcome::Relationships(s) => {
                write!(f, "{} rows, {} created, {} updated", s.rows, s.created, s.merged)
            }
            StageOutcome::Batch(s) => write!(
                f,
                "{} rows, {} distinct pairs, {} created",
                s.rows, s.distinct, s.created
            ),
            StageOutcome::Taxonomy(s) => write!(
                f,
                "{} subcategories, {} categories, {} cities",
                s.subcategories, s.categories, s.cities
            ),
            StageOutcome::Projection(s) => {
                write!(f, "{} pairs over {} bridges", s.pairs, s.bridges)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: PipelineStage,
    pub outcome: StageOutcome,
    pub elapsed_ms: u128,
}

/// Stage history of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub stages: Vec<StageReport>,
    pub elapsed_ms: u128,
}

impl PipelineReport {
    pub fn stage(&self, stage: &PipelineStage) -> Option<&StageOutcome> {
        self.stages.iter().find(|r| r.stage == *stage).map(|r| &r.outcome)
    }
}

/// A run that stopped at `stage`
#[derive(Error, Debug)]
#[error("pipeline failed during {stage}")]
pub struct PipelineFailure {
    pub stage: PipelineStage,
    pub source: PipelineError,
    /// Stages that finished before the failure
    pub completed: Vec<StageReport>,
}

pub struct Pipeline<'a, B: GraphBackend + ?Sized> {
    backend: &'a mut B,
    config: &'a PipelineConfig,
    rules: Vec<ProjectionRule>,
    state: PipelineState,
}

impl<'a, B: GraphBackend + ?Sized> Pipeline<'a, B> {
    pub fn new(backend: &'a mut B, config: &'a PipelineConfig) -> Self {
        Self {
            backend,
            config,
            rules: ProjectionRule::builtin(),
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Every stage of a run, in order
    pub fn stages(&self) -> Vec<PipelineStage> {
        let mut stages = vec![PipelineStage::Clearing];
        stages.extend(EntityKind::ALL.into_iter().map(PipelineStage::LoadingEntities));
        stages.push(PipelineStage::LoadingRelationships);
        stages.push(PipelineStage::LoadingBipartite);
        stages.push(PipelineStage::DerivingTaxonomy);
        stages.extend(self.rules.iter().map(|rule| PipelineStage::Projecting(rule.name.clone())));
        stages
    }

    pub fn run(&mut self) -> Result<PipelineReport, PipelineFailure> {
        let started = Instant::now();
        let mut completed = Vec::new();

        for stage in self.stages() {
            self.state = PipelineState::Running(stage.clone());
            info!("Stage {} started", stage);
            let timer = Instant::now();

            match self.execute(&stage) {
                Ok(outcome) => {
                    info!("Stage {} finished: {}", stage, outcome);
                    completed.push(StageReport {
                        stage,
                        outcome,
                        elapsed_ms: timer.elapsed().as_millis(),
                    });
                }
                Err(source) => {
                    error!("Stage {} failed: {}", stage, source);
                    self.state = PipelineState::Failed(stage.clone());
                    return Err(PipelineFailure {
                        stage,
                        source,
                        completed,
                    });
                }
            }
        }

        self.state = PipelineState::Done;
        let report = PipelineReport {
            stages: completed,
            elapsed_ms: started.elapsed().as_millis(),
        };
        info!("Pipeline finished in {} ms", report.elapsed_ms);
        Ok(report)
    }

    fn execute(&mut self, stage: &PipelineStage) -> PipelineResult<StageOutcome> {
        let config = self.config;
        let sources = &config.sources;
        match stage {
            PipelineStage::Clearing => {
                self.backend.reset()?;
                Ok(StageOutcome::Cleared)
            }
            PipelineStage::LoadingEntities(kind) => {
                let stats = match kind {
                    EntityKind::Person => self.load_entities::<PersonRecord>(&sources.salesperson),
                    EntityKind::Region => self.load_entities::<RegionRecord>(&sources.region),
                    EntityKind::Product => self.load_entities::<ProductRecord>(&sources.product),
                    EntityKind::Reseller => self.load_entities::<ResellerRecord>(&sources.reseller),
                }?;
                Ok(StageOutcome::Entities(stats))
            }
            PipelineStage::LoadingRelationships => {
                let path = config.source_path(&sources.salesperson_region);
                let source = TsvSource::<AssignmentRecord>::new(path);
                let stats = RelationshipLoader::new(&mut *self.backend).load(source.records()?)?;
                Ok(StageOutcome::Relationships(stats))
            }
            PipelineStage::LoadingBipartite => {
                let source = TsvSource::<SaleRecord>::new(config.source_path(&sources.sales));
                let stats = BipartiteBatchLoader::new(&mut *self.backend).load(source.records()?)?;
                Ok(StageOutcome::Batch(stats))
            }
            PipelineStage::DerivingTaxonomy => {
                let stats = TaxonomyDeriver::new(&mut *self.backend).derive()?;
                Ok(StageOutcome::Taxonomy(stats))
            }
            PipelineStage::Projecting(name) => {
                let rule = self
                    .rules
                    .iter()
                    .find(|rule| rule.name == *name)
                    .ok_or_else(|| {
                        PipelineError::Config(format!("unknown projection rule '{}'", name))
                    })?;
                let stats = MonopartiteProjector::new(&mut *self.backend).project(rule)?;
                Ok(StageOutcome::Projection(stats))
            }
        }
    }

    fn load_entities<R: EntityRecord>(&mut self, file: &str) -> PipelineResult<LoadStats> {
        let source = TsvSource::<R>::new(self.config.source_path(file));
        EntityLoader::new(&mut *self.backend).load(source.records()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphStore;

    #[test]
    fn test_stage_order() {
        let mut store = GraphStore::new();
        let config = PipelineConfig::default();
        let pipeline = Pipeline::new(&mut store, &config);

        let stages = pipeline.stages();
        assert_eq!(stages.len(), 10);
        assert_eq!(stages[0], PipelineStage::Clearing);
        assert_eq!(stages[1], PipelineStage::LoadingEntities(EntityKind::Person));
        assert_eq!(stages[8], PipelineStage::Projecting("works_with".to_string()));
        assert_eq!(stages[9].to_string(), "projecting (commonly_sold_by)");
        assert_eq!(*pipeline.state(), PipelineState::Idle);
    }

    #[test]
    fn test_missing_data_dir_fails_first_load() {
        let mut store = GraphStore::new();
        let config = PipelineConfig {
            data_dir: "/nonexistent/salesgraph".into(),
            ..PipelineConfig::default()
        };
        let mut pipeline = Pipeline::new(&mut store, &config);

        let failure = pipeline.run().unwrap_err();
        assert_eq!(failure.stage, PipelineStage::LoadingEntities(EntityKind::Person));
        assert!(matches!(failure.source, PipelineError::MissingSource { .. }));
        assert_eq!(failure.completed.len(), 1);
        assert_eq!(
            *pipeline.state(),
            PipelineState::Failed(PipelineStage::LoadingEntities(EntityKind::Person))
        );
        assert_eq!(failure.to_string(), "pipeline failed during loading entities (Person)");
    }
}
