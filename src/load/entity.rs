//! Entity node loader

use super::records::EntityRecord;
use super::LoadStats;
use crate::error::PipelineResult;
use crate::graph::{GraphBackend, Label, UpsertOutcome};
use tracing::info;

/// Upserts one node per record, keyed by the record's natural key
pub struct EntityLoader<'a, B: GraphBackend + ?Sized> {
    backend: &'a mut B,
}

impl<'a, B: GraphBackend + ?Sized> EntityLoader<'a, B> {
    pub fn new(backend: &'a mut B) -> Self {
        Self { backend }
    }

    /// Load every record, stopping at the first error.
    ///
    /// Duplicate keys within the input overwrite earlier attributes.
    pub fn load<R, I>(&mut self, records: I) -> PipelineResult<LoadStats>
    where
        R: EntityRecord,
        I: IntoIterator<Item = PipelineResult<R>>,
    {
        let label = Label::new(R::LABEL);
        let mut stats = LoadStats::default();

        for record in records {
            let record = record?;
            stats.rows += 1;
            let key = record.key();
            match self.backend.upsert_node(&label, key, record.into_properties())? {
                UpsertOutcome::Created => stats.created += 1,
                UpsertOutcome::Merged => stats.merged += 1,
            }
        }

        info!(
            "Loaded {} {} rows ({} created, {} updated)",
            stats.rows, label, stats.created, stats.merged
        );
        Ok(stats)
    }
}
