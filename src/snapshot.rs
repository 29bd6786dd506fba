//! Store snapshots
//!
//! A snapshot is the whole graph serialized with bincode inside a gzip
//! stream. Node and edge identifiers are preserved on restore.

use crate::error::PipelineError;
use crate::graph::{
    Edge, EdgeId, EdgeType, GraphError, GraphStore, Label, Node, NodeId, NodeKey, PropertyMap,
};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Corrupt snapshot: {0}")]
    Corrupt(#[from] GraphError),

    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

impl From<SnapshotError> for PipelineError {
    fn from(err: SnapshotError) -> Self {
        PipelineError::StoreUnavailable(err.to_string())
    }
}

/// Tagged key encoding; bincode cannot read the untagged form
#[derive(Debug, Clone, Serialize, Deserialize)]
enum StoredKey {
    Int(i64),
    Text(String),
}

impl From<&NodeKey> for StoredKey {
    fn from(key: &NodeKey) -> Self {
        match key {
            NodeKey::Int(i) => StoredKey::Int(*i),
            NodeKey::Text(s) => StoredKey::Text(s.clone()),
        }
    }
}

impl From<StoredKey> for NodeKey {
    fn from(key: StoredKey) -> Self {
        match key {
            StoredKey::Int(i) => NodeKey::Int(i),
            StoredKey::Text(s) => NodeKey::Text(s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredNode {
    id: u64,
    label: String,
    key: StoredKey,
    properties: PropertyMap,
    created_at: i64,
    updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEdge {
    id: u64,
    source: u64,
    target: u64,
    edge_type: String,
    properties: PropertyMap,
    created_at: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    taken_at: i64,
    nodes: Vec<StoredNode>,
    edges: Vec<StoredEdge>,
}

/// Snapshot counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub nodes: usize,
    pub edges: usize,
}

/// Write every node and edge of `store` to `path`
pub fn write_snapshot(store: &GraphStore, path: impl AsRef<Path>) -> SnapshotResult<SnapshotInfo> {
    let path = path.as_ref();
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        taken_at: chrono::Utc::now().timestamp_millis(),
        nodes: store
            .all_nodes()
            .map(|node| StoredNode {
                id: node.id.as_u64(),
                label: node.label.as_str().to_string(),
                key: StoredKey::from(&node.key),
                properties: node.properties.clone(),
                created_at: node.created_at,
                updated_at: node.updated_at,
            })
            .collect(),
        edges: store
            .all_edges()
            .map(|edge| StoredEdge {
                id: edge.id.as_u64(),
                source: edge.source.as_u64(),
                target: edge.target.as_u64(),
                edge_type: edge.edge_type.as_str().to_string(),
                properties: edge.properties.clone(),
                created_at: edge.created_at,
            })
            .collect(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut encoder = GzEncoder::new(BufWriter::new(File::create(path)?), Compression::default());
    bincode::serialize_into(&mut encoder, &snapshot)?;
    encoder.finish()?.flush()?;

    let info = SnapshotInfo {
        nodes: snapshot.nodes.len(),
        edges: snapshot.edges.len(),
    };
    info!(
        "Wrote snapshot with {} nodes and {} edges to {}",
        info.nodes,
        info.edges,
        path.display()
    );
    Ok(info)
}

/// Rebuild a store from a snapshot file
pub fn read_snapshot(path: impl AsRef<Path>) -> SnapshotResult<GraphStore> {
    let path = path.as_ref();
    let decoder = GzDecoder::new(BufReader::new(File::open(path)?));
    let snapshot: Snapshot = bincode::deserialize_from(decoder)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(snapshot.version));
    }

    let mut store = GraphStore::new();
    for stored in snapshot.nodes {
        store.insert_recovered_node(Node {
            id: NodeId::new(stored.id),
            label: Label::new(stored.label),
            key: stored.key.into(),
            properties: stored.properties,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        })?;
    }
    for stored in snapshot.edges {
        store.insert_recovered_edge(Edge {
            id: EdgeId::new(stored.id),
            source: NodeId::new(stored.source),
            target: NodeId::new(stored.target),
            edge_type: EdgeType::new(stored.edge_type),
            properties: stored.properties,
            created_at: stored.created_at,
        })?;
    }

    info!(
        "Restored {} nodes and {} edges from {}",
        store.node_count(),
        store.edge_count(),
        path.display()
    );
    Ok(store)
}
