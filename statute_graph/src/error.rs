//! Error types for graph storage and library access.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the triple store and document libraries.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("triple has an empty {0}")]
    EmptyComponent(&'static str),

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("document {id} is not ready (status: {status})")]
    DocumentNotReady { id: String, status: String },

    #[error("library manifest missing at {0}")]
    ManifestMissing(PathBuf),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl GraphError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
