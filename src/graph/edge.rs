//! Edge implementation for the sales graph
//!
//! Edges are directed and identified by (type, source, target): the store
//! never holds two edges with the same triple.

use super::property::{PropertyMap, PropertyValue};
use super::types::{EdgeId, EdgeType, NodeId};
use serde::{Deserialize, Serialize};

/// A directed edge in the property graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Store-assigned identifier
    pub id: EdgeId,

    /// Source node (edge goes FROM this node)
    pub source: NodeId,

    /// Target node (edge goes TO this node)
    pub target: NodeId,

    /// Type of relationship (e.g., "ASSIGNED_TO", "WORKS_WITH")
    pub edge_type: EdgeType,

    /// Properties associated with this edge
    pub properties: PropertyMap,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

impl Edge {
    /// Create a new directed edge with properties
    pub fn new(
        id: EdgeId,
        source: NodeId,
        target: NodeId,
        edge_type: impl Into<EdgeType>,
        properties: PropertyMap,
    ) -> Self {
        Edge {
            id,
            source,
            target,
            edge_type: edge_type.into(),
            properties,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
