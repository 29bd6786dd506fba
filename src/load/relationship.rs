//! Relationship loader

use super::records::LinkRecord;
use super::LoadStats;
use crate::error::PipelineResult;
use crate::graph::{EdgeType, GraphBackend, Label, NodeRef, PropertyMap, UpsertOutcome};
use tracing::info;

/// Upserts one edge per record between two already-loaded entities
pub struct RelationshipLoader<'a, B: GraphBackend + ?Sized> {
    backend: &'a mut B,
}

impl<'a, B: GraphBackend + ?Sized> RelationshipLoader<'a, B> {
    pub fn new(backend: &'a mut B) -> Self {
        Self { backend }
    }

    /// Load every record. An unknown endpoint aborts with `DanglingReference`.
    pub fn load<R, I>(&mut self, records: I) -> PipelineResult<LoadStats>
    where
        R: LinkRecord,
        I: IntoIterator<Item = PipelineResult<R>>,
    {
        let from_label = Label::new(R::FROM_LABEL);
        let to_label = Label::new(R::TO_LABEL);
        let edge_type = EdgeType::new(R::EDGE_TYPE);
        let mut stats = LoadStats::default();

        for record in records {
            let (from, to) = record?.endpoints();
            stats.rows += 1;
            let outcome = self.backend.upsert_edge(
                &edge_type,
                NodeRef::new(&from_label, &from),
                NodeRef::new(&to_label, &to),
                PropertyMap::new(),
            )?;
            match outcome {
                UpsertOutcome::Created => stats.created += 1,
                UpsertOutcome::Merged => stats.merged += 1,
            }
        }

        info!(
            "Loaded {} {} rows ({} created, {} existing)",
            stats.rows, edge_type, stats.created, stats.merged
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::graph::{GraphStore, NodeKey};
    use crate::load::records::AssignmentRecord;

    fn seeded() -> GraphStore {
        let mut store = GraphStore::new();
        for key in [1, 2] {
            store.upsert_node("Person", NodeKey::Int(key), PropertyMap::new());
        }
        store.upsert_node("Region", NodeKey::Int(10), PropertyMap::new());
        store
    }

    fn assignment(person: i64, region: i64) -> PipelineResult<AssignmentRecord> {
        Ok(AssignmentRecord { person, region })
    }

    #[test]
    fn test_reupsert_is_noop() {
        let mut store = seeded();
        let stats = RelationshipLoader::new(&mut store)
            .load(vec![assignment(1, 10), assignment(2, 10), assignment(1, 10)])
            .unwrap();

        assert_eq!(stats, LoadStats { rows: 3, created: 2, merged: 1 });
        assert_eq!(store.edge_count(), 2);
    }

    #[test]
    fn test_dangling_region() {
        let mut store = seeded();
        let err = RelationshipLoader::new(&mut store)
            .load(vec![assignment(1, 10), assignment(2, 77)])
            .unwrap_err();

        match err {
            PipelineError::DanglingReference { label, key } => {
                assert_eq!(label, Label::new("Region"));
                assert_eq!(key, NodeKey::Int(77));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.edge_count(), 1);
    }
}
