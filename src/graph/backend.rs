//! Graph store boundary
//!
//! Loaders and projectors only talk to the store through [`GraphBackend`]:
//! reset, keyed upserts, a one-hop pattern match and a label scan. The
//! in-memory [`GraphStore`] is the implementation shipped with the crate.

use super::property::PropertyMap;
use super::store::{GraphError, GraphStore, UpsertOutcome};
use super::types::{EdgeType, Label, NodeId, NodeKey};
use thiserror::Error;

/// Errors surfaced by a graph backend
#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    /// An edge endpoint was never loaded
    #[error("{label} node with key {key} has not been loaded")]
    DanglingReference { label: Label, key: NodeKey },

    /// Connection or transport failure
    #[error("graph store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A node addressed by its natural identity
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    pub label: &'a Label,
    pub key: &'a NodeKey,
}

impl<'a> NodeRef<'a> {
    pub fn new(label: &'a Label, key: &'a NodeKey) -> Self {
        Self { label, key }
    }
}

/// The store capabilities the pipeline depends on
pub trait GraphBackend {
    /// Remove every node and edge. Idempotent.
    fn reset(&mut self) -> StoreResult<()>;

    /// Insert or overwrite the node identified by (label, key)
    fn upsert_node(
        &mut self,
        label: &Label,
        key: NodeKey,
        properties: PropertyMap,
    ) -> StoreResult<UpsertOutcome>;

    /// Insert the directed edge unless it already exists.
    ///
    /// Both endpoints must have been loaded; otherwise the call fails with
    /// [`StoreError::DanglingReference`] and nothing is written.
    fn upsert_edge(
        &mut self,
        edge_type: &EdgeType,
        from: NodeRef<'_>,
        to: NodeRef<'_>,
        properties: PropertyMap,
    ) -> StoreResult<UpsertOutcome>;

    /// All `(from_key, to_key)` pairs matching
    /// `(:from_label)-[:edge_type]->(:to_label)`, sorted.
    fn match_hop(
        &self,
        from_label: &Label,
        edge_type: &EdgeType,
        to_label: &Label,
    ) -> StoreResult<Vec<(NodeKey, NodeKey)>>;

    /// Every node of `label` with its attributes, ordered by key
    fn scan_label(&self, label: &Label) -> StoreResult<Vec<(NodeKey, PropertyMap)>>;
}

impl GraphStore {
    fn resolve(&self, node: NodeRef<'_>) -> StoreResult<NodeId> {
        self.node_id(node.label, node.key)
            .ok_or_else(|| StoreError::DanglingReference {
                label: node.label.clone(),
                key: node.key.clone(),
            })
    }
}

impl GraphBackend for GraphStore {
    fn reset(&mut self) -> StoreResult<()> {
        self.clear();
        Ok(())
    }

    fn upsert_node(
        &mut self,
        label: &Label,
        key: NodeKey,
        properties: PropertyMap,
    ) -> StoreResult<UpsertOutcome> {
        let (_, outcome) = GraphStore::upsert_node(self, label.clone(), key, properties);
        Ok(outcome)
    }

    fn upsert_edge(
        &mut self,
        edge_type: &EdgeType,
        from: NodeRef<'_>,
        to: NodeRef<'_>,
        properties: PropertyMap,
    ) -> StoreResult<UpsertOutcome> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;
        let (_, outcome) =
            GraphStore::upsert_edge(self, source, target, edge_type.clone(), properties)?;
        Ok(outcome)
    }

    fn match_hop(
        &self,
        from_label: &Label,
        edge_type: &EdgeType,
        to_label: &Label,
    ) -> StoreResult<Vec<(NodeKey, NodeKey)>> {
        let mut pairs = Vec::new();
        for source in self.get_nodes_by_label(from_label) {
            for edge in self.get_outgoing_edges(source.id) {
                if edge.edge_type != *edge_type {
                    continue;
                }
                if let Some(target) = self.get_node(edge.target).filter(|n| n.has_label(to_label)) {
                    pairs.push((source.key.clone(), target.key.clone()));
                }
            }
        }
        pairs.sort();
        Ok(pairs)
    }

    fn scan_label(&self, label: &Label) -> StoreResult<Vec<(NodeKey, PropertyMap)>> {
        Ok(self
            .get_nodes_by_label(label)
            .into_iter()
            .map(|node| (node.key.clone(), node.properties.clone()))
            .collect())
    }
}
