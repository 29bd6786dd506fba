//! Salesgraph
//!
//! Builds a labeled property graph from tab-separated sales exports and
//! derives monopartite relationships for downstream graph analytics.
//!
//! # Architecture
//!
//! - [`graph`]: property graph model, in-memory store, [`GraphBackend`] boundary
//! - [`load`]: typed TSV sources, entity/relationship/batch loaders, taxonomy
//! - [`projection`]: shared-neighbor projections, view catalog, CSR export
//! - [`pipeline`]: the sequential stage machine tying it together
//! - [`snapshot`]: gzip + bincode store snapshots
//!
//! ## Example Usage
//!
//! ```rust
//! use salesgraph::graph::{GraphStore, NodeKey, PropertyMap};
//! use salesgraph::projection::{MonopartiteProjector, ProjectionRule};
//!
//! let mut store = GraphStore::new();
//! let (region, _) = store.upsert_node("Region", NodeKey::Int(10), PropertyMap::new());
//! for key in [1, 2, 3] {
//!     let (person, _) = store.upsert_node("Person", NodeKey::Int(key), PropertyMap::new());
//!     store.upsert_edge(person, region, "ASSIGNED_TO", PropertyMap::new()).unwrap();
//! }
//!
//! let stats = MonopartiteProjector::new(&mut store)
//!     .project(&ProjectionRule::works_with())
//!     .unwrap();
//! assert_eq!(stats.pairs, 3);
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod load;
pub mod pipeline;
pub mod projection;
pub mod schema;
pub mod snapshot;

// Re-export main types for convenience
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use graph::{GraphBackend, GraphStore, Label, NodeKey, PropertyMap, PropertyValue};
pub use pipeline::{Pipeline, PipelineFailure, PipelineReport, PipelineStage, PipelineState};
pub use projection::{build_view, ProjectionCatalog, ProjectionRule, ProjectionSpec};
pub use salesgraph_view::GraphView;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
