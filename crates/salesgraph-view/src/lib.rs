//! Read-only graph topology handed to external algorithm runtimes.
//!
//! A [`GraphView`] is a dense, integer-indexed snapshot of one named
//! projection. Shortest path, community detection, centrality and similarity
//! runtimes consume it; nothing in this crate computes over it.

use std::collections::HashMap;

/// Node identifier as assigned by the graph store (u64)
pub type NodeId = u64;

/// A dense, integer-indexed view of a projected subgraph in Compressed Sparse Row (CSR) format.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,
    /// Mapping from dense index (0..N) back to NodeId
    pub index_to_node: Vec<NodeId>,
    /// Mapping from NodeId to dense index
    #[cfg_attr(feature = "serde", serde(skip))]
    pub node_to_index: HashMap<NodeId, usize>,

    /// Offsets into `out_targets`. Size = node_count + 1
    pub out_offsets: Vec<usize>,
    /// Contiguous array of target node indices
    pub out_targets: Vec<usize>,

    /// Offsets into `in_sources`. Size = node_count + 1
    pub in_offsets: Vec<usize>,
    /// Contiguous array of source node indices
    pub in_sources: Vec<usize>,

    /// Edge weights, aligned with `out_targets`
    pub weights: Option<Vec<f64>>,
}

impl GraphView {
    /// Build a CSR view from per-node adjacency lists.
    ///
    /// `outgoing[i]` holds `(target_index, weight)` pairs for the node at dense
    /// index `i`; `index_to_node[i]` is its store identifier. Weights are kept
    /// only when `weighted` is set. Incoming lists are derived.
    pub fn from_adjacency_list(
        index_to_node: Vec<NodeId>,
        outgoing: Vec<Vec<(usize, f64)>>,
        weighted: bool,
    ) -> Self {
        let node_count = index_to_node.len();
        let node_to_index = index_to_node
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();

        let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        let mut out_offsets = Vec::with_capacity(node_count + 1);
        let mut out_targets = Vec::new();
        let mut flat_weights = if weighted { Some(Vec::new()) } else { None };

        out_offsets.push(0);
        for (source, neighbors) in outgoing.into_iter().enumerate() {
            for (target, weight) in neighbors {
                out_targets.push(target);
                incoming[target].push(source);
                if let Some(ref mut w_flat) = flat_weights {
                    w_flat.push(weight);
                }
            }
            out_offsets.push(out_targets.len());
        }
        // Nodes without an adjacency row still need an offset entry
        while out_offsets.len() < node_count + 1 {
            out_offsets.push(out_targets.len());
        }

        let mut in_offsets = Vec::with_capacity(node_count + 1);
        let mut in_sources = Vec::new();
        in_offsets.push(0);
        for sources in incoming {
            in_sources.extend(sources);
            in_offsets.push(in_sources.len());
        }

        GraphView {
            node_count,
            index_to_node,
            node_to_index,
            out_offsets,
            out_targets,
            in_offsets,
            in_sources,
            weights: flat_weights,
        }
    }

    /// Total number of directed adjacencies in the view
    pub fn edge_count(&self) -> usize {
        self.out_targets.len()
    }

    /// Get the out-degree of a node (by index)
    pub fn out_degree(&self, idx: usize) -> usize {
        self.out_offsets[idx + 1] - self.out_offsets[idx]
    }

    /// Get the in-degree of a node (by index)
    pub fn in_degree(&self, idx: usize) -> usize {
        self.in_offsets[idx + 1] - self.in_offsets[idx]
    }

    /// Get outgoing neighbors (successors) of a node
    pub fn successors(&self, idx: usize) -> &[usize] {
        let start = self.out_offsets[idx];
        let end = self.out_offsets[idx + 1];
        &self.out_targets[start..end]
    }

    /// Get incoming neighbors (predecessors) of a node
    pub fn predecessors(&self, idx: usize) -> &[usize] {
        let start = self.in_offsets[idx];
        let end = self.in_offsets[idx + 1];
        &self.in_sources[start..end]
    }

    /// Get weights for outgoing edges of a node
    pub fn weights(&self, idx: usize) -> Option<&[f64]> {
        self.weights.as_ref().map(|w| {
            let start = self.out_offsets[idx];
            let end = self.out_offsets[idx + 1];
            &w[start..end]
        })
    }

    /// Dense index of a store node, if it is part of this view
    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.node_to_index.get(&node).copied()
    }
}
