//! Error types for amendment analysis.

use std::path::PathBuf;

use statute_graph::GraphError;
use thiserror::Error;

/// Structural failures that abort an analysis call.
///
/// Per-amendment problems never surface here; they are recorded in the
/// result structures and processing continues.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Why an amendment target could not be mapped onto the graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("amendment has no target title")]
    MissingTitle,

    #[error("amendment has no target section")]
    MissingSection,

    #[error("document {0} not found in library")]
    DocumentNotFound(String),

    #[error("failed to load document {id}: {reason}")]
    LoadFailed { id: String, reason: String },
}

/// Result alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
