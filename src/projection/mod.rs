//! Derived relationships and named views
//!
//! - [`monopartite`] collapses bipartite hops into direct member links
//! - [`catalog`] names the views handed to algorithm runtimes
//! - [`export`] materializes views as CSR and writes them out

pub mod catalog;
pub mod export;
pub mod monopartite;

pub use catalog::{
    Orientation, ProjectionCatalog, ProjectionSpec, RelationshipProjection, WeightProperty,
};
pub use export::{build_view, export_catalog, ExportedView, ViewExport, ViewNode};
pub use monopartite::{Direction, Leg, MonopartiteProjector, ProjectionRule, ProjectionStats};
