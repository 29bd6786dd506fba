//! Property graph data model and store
//!
//! This module implements the labeled property graph the pipeline writes to:
//! - Nodes with one label, a natural key and attributes
//! - Directed, typed edges unique per (type, source, target)
//! - An in-memory store plus the [`GraphBackend`] boundary used by loaders

pub mod backend;
pub mod edge;
pub mod node;
pub mod property;
pub mod store;
pub mod types;

// Re-export main types
pub use backend::{GraphBackend, NodeRef, StoreError, StoreResult};
pub use edge::Edge;
pub use node::Node;
pub use property::{PropertyMap, PropertyValue};
pub use store::{GraphError, GraphResult, GraphStore, UpsertOutcome};
pub use types::{EdgeId, EdgeType, Label, NodeId, NodeKey};
