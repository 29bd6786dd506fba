//! In-memory graph storage implementation
//!
//! Nodes are addressed by (label, natural key) and edges by
//! (type, source, target), so every write through this store is an upsert:
//! re-importing a key overwrites attributes in place and re-linking a pair
//! never creates a parallel edge.

use super::edge::Edge;
use super::node::Node;
use super::property::PropertyMap;
use super::types::{EdgeId, EdgeType, Label, NodeId, NodeKey};
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),

    #[error("Duplicate node id {0}")]
    DuplicateNodeId(NodeId),

    #[error("Duplicate edge id {0}")]
    DuplicateEdgeId(EdgeId),

    #[error("Duplicate {label} node with key {key}")]
    DuplicateKey { label: Label, key: NodeKey },

    #[error("Duplicate {edge_type} edge from {from} to {to}")]
    DuplicateEdge {
        edge_type: EdgeType,
        from: NodeId,
        to: NodeId,
    },
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Whether an upsert inserted a new element or matched an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Merged,
}

impl UpsertOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, UpsertOutcome::Created)
    }
}

/// In-memory graph storage
///
/// Uses hash maps for O(1) upsert lookups:
/// - nodes / edges: arenas indexed by id
/// - outgoing: NodeId -> Vec<EdgeId> adjacency lists
/// - label_index: Label -> (NodeKey -> NodeId), ordered by key
/// - edge_index: EdgeType -> (source, target) -> EdgeId
#[derive(Debug, Default)]
pub struct GraphStore {
    /// Node arena (NodeId -> Node)
    nodes: Vec<Option<Node>>,

    /// Edge arena (EdgeId -> Edge)
    edges: Vec<Option<Edge>>,

    /// Outgoing edges for each node (adjacency list)
    outgoing: Vec<Vec<EdgeId>>,

    /// Natural key index per label
    label_index: HashMap<Label, BTreeMap<NodeKey, NodeId>>,

    /// Edge identity index
    edge_index: FxHashMap<EdgeType, FxHashMap<(NodeId, NodeId), EdgeId>>,

    /// Edge type index in insertion order
    edge_type_index: HashMap<EdgeType, Vec<EdgeId>>,

    node_total: usize,
    edge_total: usize,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update the node identified by (label, key).
    ///
    /// On update every non-key attribute is replaced by `properties`.
    pub fn upsert_node(
        &mut self,
        label: impl Into<Label>,
        key: NodeKey,
        properties: PropertyMap,
    ) -> (NodeId, UpsertOutcome) {
        let label = label.into();

        if let Some(id) = self.node_id(&label, &key) {
            if let Some(node) = self.get_node_mut(id) {
                node.overwrite_properties(properties);
            }
            return (id, UpsertOutcome::Merged);
        }

        let node_id = NodeId::new(self.nodes.len() as u64);
        self.label_index
            .entry(label.clone())
            .or_default()
            .insert(key.clone(), node_id);

        self.nodes.push(Some(Node::new(node_id, label, key, properties)));
        self.outgoing.push(Vec::new());
        self.node_total += 1;
        (node_id, UpsertOutcome::Created)
    }

    /// Resolve a natural key to the store identifier
    pub fn node_id(&self, label: &Label, key: &NodeKey) -> Option<NodeId> {
        self.label_index.get(label).and_then(|keys| keys.get(key)).copied()
    }

    /// Find a node by label and natural key
    pub fn find_node(&self, label: &Label, key: &NodeKey) -> Option<&Node> {
        self.node_id(label, key).and_then(|id| self.get_node(id))
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.as_u64() as usize).and_then(Option::as_ref)
    }

    /// Get a mutable node by ID
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.as_u64() as usize).and_then(Option::as_mut)
    }

    /// Check if a node exists
    pub fn has_node(&self, id: NodeId) -> bool {
        self.get_node(id).is_some()
    }

    /// Insert the (type, source, target) edge unless it already exists.
    ///
    /// When the edge exists, `properties` are merged into it and no new
    /// edge is created.
    pub fn upsert_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: impl Into<EdgeType>,
        properties: PropertyMap,
    ) -> GraphResult<(EdgeId, UpsertOutcome)> {
        // Validate nodes exist
        if !self.has_node(source) {
            return Err(GraphError::InvalidEdgeSource(source));
        }
        if !self.has_node(target) {
            return Err(GraphError::InvalidEdgeTarget(target));
        }

        let edge_type = edge_type.into();
        if let Some(edge_id) = self.edge_id(&edge_type, source, target) {
            if let Some(edge) = self.get_edge_mut(edge_id) {
                edge.properties.extend(properties);
            }
            return Ok((edge_id, UpsertOutcome::Merged));
        }

        let edge_id = EdgeId::new(self.edges.len() as u64);
        let edge = Edge::new(edge_id, source, target, edge_type, properties);
        self.link(edge);
        Ok((edge_id, UpsertOutcome::Created))
    }

    fn edge_id(&self, edge_type: &EdgeType, source: NodeId, target: NodeId) -> Option<EdgeId> {
        self.edge_index
            .get(edge_type)
            .and_then(|pairs| pairs.get(&(source, target)))
            .copied()
    }

    /// Register an edge in the arena and every index
    fn link(&mut self, edge: Edge) {
        let idx = edge.id.as_u64() as usize;
        if idx >= self.edges.len() {
            self.edges.resize(idx + 1, None);
        }

        self.outgoing[edge.source.as_u64() as usize].push(edge.id);
        self.edge_index
            .entry(edge.edge_type.clone())
            .or_default()
            .insert((edge.source, edge.target), edge.id);
        self.edge_type_index
            .entry(edge.edge_type.clone())
            .or_default()
            .push(edge.id);

        self.edges[idx] = Some(edge);
        self.edge_total += 1;
    }

    /// Find the edge of `edge_type` from `source` to `target`
    pub fn find_edge(&self, edge_type: &EdgeType, source: NodeId, target: NodeId) -> Option<&Edge> {
        self.edge_id(edge_type, source, target).and_then(|id| self.get_edge(id))
    }

    /// Get an edge by ID
    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.as_u64() as usize).and_then(Option::as_ref)
    }

    /// Get a mutable edge by ID
    pub fn get_edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(id.as_u64() as usize).and_then(Option::as_mut)
    }

    /// Get all outgoing edges from a node
    pub fn get_outgoing_edges(&self, node_id: NodeId) -> Vec<&Edge> {
        self.outgoing
            .get(node_id.as_u64() as usize)
            .map(|edge_ids| edge_ids.iter().filter_map(|&id| self.get_edge(id)).collect())
            .unwrap_or_default()
    }

    /// Get all nodes with a specific label, ordered by natural key
    pub fn get_nodes_by_label(&self, label: &Label) -> Vec<&Node> {
        self.label_index
            .get(label)
            .map(|keys| keys.values().filter_map(|&id| self.get_node(id)).collect())
            .unwrap_or_default()
    }

    /// Get all edges of a specific type, in creation order
    pub fn get_edges_by_type(&self, edge_type: &EdgeType) -> Vec<&Edge> {
        self.edge_type_index
            .get(edge_type)
            .map(|edge_ids| edge_ids.iter().filter_map(|&id| self.get_edge(id)).collect())
            .unwrap_or_default()
    }

    /// Get total number of nodes
    pub fn node_count(&self) -> usize {
        self.node_total
    }

    /// Get total number of edges
    pub fn edge_count(&self) -> usize {
        self.edge_total
    }

    /// Number of nodes carrying `label`
    pub fn label_count(&self, label: &Label) -> usize {
        self.label_index.get(label).map_or(0, BTreeMap::len)
    }

    /// Number of edges of `edge_type`
    pub fn edge_type_count(&self, edge_type: &EdgeType) -> usize {
        self.edge_type_index.get(edge_type).map_or(0, Vec::len)
    }

    /// Iterate over all nodes in id order
    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().flatten()
    }

    /// Iterate over all edges in id order
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().flatten()
    }

    /// Clear all data from the graph
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.outgoing.clear();
        self.label_index.clear();
        self.edge_index.clear();
        self.edge_type_index.clear();
        self.node_total = 0;
        self.edge_total = 0;
    }

    // ============================================================
    // Recovery methods - used to rebuild the graph from a snapshot
    // ============================================================

    /// Insert a recovered node, preserving its ID
    pub fn insert_recovered_node(&mut self, node: Node) -> GraphResult<()> {
        if self.node_id(&node.label, &node.key).is_some() {
            return Err(GraphError::DuplicateKey {
                label: node.label,
                key: node.key,
            });
        }

        if self.has_node(node.id) {
            return Err(GraphError::DuplicateNodeId(node.id));
        }

        let idx = node.id.as_u64() as usize;
        if idx >= self.nodes.len() {
            self.nodes.resize(idx + 1, None);
            self.outgoing.resize(idx + 1, Vec::new());
        }

        self.label_index
            .entry(node.label.clone())
            .or_default()
            .insert(node.key.clone(), node.id);
        self.nodes[idx] = Some(node);
        self.node_total += 1;
        Ok(())
    }

    /// Insert a recovered edge, preserving its ID.
    /// Source and target nodes must already exist.
    pub fn insert_recovered_edge(&mut self, edge: Edge) -> GraphResult<()> {
        if !self.has_node(edge.source) {
            return Err(GraphError::InvalidEdgeSource(edge.source));
        }
        if !self.has_node(edge.target) {
            return Err(GraphError::InvalidEdgeTarget(edge.target));
        }
        if self.get_edge(edge.id).is_some() {
            return Err(GraphError::DuplicateEdgeId(edge.id));
        }
        if self.edge_id(&edge.edge_type, edge.source, edge.target).is_some() {
            return Err(GraphError::DuplicateEdge {
                edge_type: edge.edge_type,
                from: edge.source,
                to: edge.target,
            });
        }

        self.link(edge);
        Ok(())
    }
}
