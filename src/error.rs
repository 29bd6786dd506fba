//! Pipeline error taxonomy

use crate::graph::{Label, NodeKey, StoreError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source file absent/unreadable, or a required column is missing
    #[error("missing source {}: {reason}", .path.display())]
    MissingSource { path: PathBuf, reason: String },

    /// A key column holds a value that is not an integer
    #[error("{}:{line}: column '{column}' value '{value}' is not a valid {expected}", .path.display())]
    TypeCoercion {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
        expected: &'static str,
    },

    /// A relationship references a node that was never loaded
    #[error("dangling reference: {label} with key {key} has not been loaded")]
    DanglingReference { label: Label, key: NodeKey },

    /// Store connection/transport or persistence failure
    #[error("graph store unavailable: {0}")]
    StoreUnavailable(String),

    /// Configuration file unreadable or invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// Projection views could not be written out
    #[error("export to {} failed: {reason}", .path.display())]
    Export { path: PathBuf, reason: String },
}

pub type PipelineResult<T> = Result<T, PipelineError>;

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DanglingReference { label, key } => {
                PipelineError::DanglingReference { label, key }
            }
            StoreError::Unavailable(reason) => PipelineError::StoreUnavailable(reason),
            StoreError::Graph(inner) => PipelineError::StoreUnavailable(inner.to_string()),
        }
    }
}
