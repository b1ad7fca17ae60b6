//! Domain-specific errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::tree::NodeId;

/// Failures that end a pick-and-confirm run. Every variant is returned only
/// after the workflow state has been reset.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("no CSV or TSV file under {}", .0.display())]
    EmptySelection(PathBuf),
    #[error("coordinate fields and at least one CSV/TSV file are required")]
    MissingFields,
    #[error("can't load file {}: {issue}", path.display())]
    InvalidLayer { path: PathBuf, issue: LayerIssue },
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("selected paths share no common directory")]
    NoCommonAncestor,
    #[error("no root directory has been chosen")]
    NoRoot,
    #[error("node {} is not part of the current tree", .0.index())]
    UnknownNode(NodeId),
}

impl WorkflowError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        WorkflowError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Why a candidate file could not become a point layer.
#[derive(Debug, Error)]
pub enum LayerIssue {
    #[error("unsupported file extension")]
    UnsupportedExtension,
    #[error("file is empty")]
    MissingHeader,
    #[error("column '{0}' not found in header")]
    MissingField(String),
    #[error("row {row}: value '{value}' in column '{field}' is not a coordinate")]
    MalformedCoordinate {
        row: usize,
        field: String,
        value: String,
    },
    #[error(transparent)]
    Unreadable(#[from] io::Error),
}
