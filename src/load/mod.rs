//! Loading tabular sources into the graph
//!
//! Sources yield typed records; loaders turn them into keyed node and edge
//! upserts against a [`GraphBackend`](crate::graph::GraphBackend).

pub mod bipartite;
pub mod entity;
pub mod records;
pub mod relationship;
pub mod source;
pub mod taxonomy;

use serde::Serialize;

pub use bipartite::BipartiteBatchLoader;
pub use entity::EntityLoader;
pub use records::{
    AssignmentRecord, EntityRecord, FromRow, LinkRecord, PersonRecord, ProductRecord, RegionRecord,
    ResellerRecord, SaleRecord,
};
pub use relationship::RelationshipLoader;
pub use source::{Records, Row, TsvSource};
pub use taxonomy::{TaxonomyDeriver, TaxonomyStats};

/// Counts from one entity or relationship load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Records read from the source
    pub rows: usize,
    pub created: usize,
    pub merged: usize,
}

/// Counts from one deduplicated batch load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub rows: usize,
    /// Distinct (from, to) pairs written
    pub distinct: usize,
    pub created: usize,
    pub merged: usize,
}
