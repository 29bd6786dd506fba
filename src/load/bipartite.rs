//! Deduplicating batch loader for large link sources
//!
//! A sales fact table repeats the same (reseller, product) pair once per order
//! line. The whole input is reduced to its distinct pairs before the first
//! write, so the store sees each edge exactly once per run.

use super::records::LinkRecord;
use super::BatchStats;
use crate::error::PipelineResult;
use crate::graph::{EdgeType, GraphBackend, Label, NodeKey, NodeRef, PropertyMap, UpsertOutcome};
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use tracing::{debug, info};

/// Distinct pairs in first-seen order
type PairSet = IndexSet<(NodeKey, NodeKey), FxBuildHasher>;

pub struct BipartiteBatchLoader<'a, B: GraphBackend + ?Sized> {
    backend: &'a mut B,
}

impl<'a, B: GraphBackend + ?Sized> BipartiteBatchLoader<'a, B> {
    pub fn new(backend: &'a mut B) -> Self {
        Self { backend }
    }

    pub fn load<R, I>(&mut self, records: I) -> PipelineResult<BatchStats>
    where
        R: LinkRecord,
        I: IntoIterator<Item = PipelineResult<R>>,
    {
        let mut rows = 0;
        let mut pairs = PairSet::default();
        for record in records {
            pairs.insert(record?.endpoints());
            rows += 1;
        }
        debug!("Reduced {} {} rows to {} distinct pairs", rows, R::EDGE_TYPE, pairs.len());

        let from_label = Label::new(R::FROM_LABEL);
        let to_label = Label::new(R::TO_LABEL);
        let edge_type = EdgeType::new(R::EDGE_TYPE);
        let mut stats = BatchStats {
            rows,
            distinct: pairs.len(),
            ..BatchStats::default()
        };

        for (from, to) in &pairs {
            let outcome = self.backend.upsert_edge(
                &edge_type,
                NodeRef::new(&from_label, from),
                NodeRef::new(&to_label, to),
                PropertyMap::new(),
            )?;
            match outcome {
                UpsertOutcome::Created => stats.created += 1,
                UpsertOutcome::Merged => stats.merged += 1,
            }
        }

        info!(
            "Loaded {} {} rows as {} distinct edges ({} created)",
            stats.rows, edge_type, stats.distinct, stats.created
        );
        Ok(stats)
    }
}
