//! Library - catalogue of ingested statute documents.
//!
//! A library maps document identifiers (for example `us-usc-title-15`) to
//! per-document graph snapshots. Analysis code only ever reads from a library;
//! it never writes back.

mod directory;
mod memory;

pub use directory::*;
pub use memory::*;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::store::TripleStore;

/// Ingestion state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Ready,
    Ingesting,
    Failed,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentStatus::Ready => "ready",
            DocumentStatus::Ingesting => "ingesting",
            DocumentStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Catalogue entry describing one ingested document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DocumentEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub jurisdiction: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub triple_count: usize,
}

impl DocumentEntry {
    /// Create a ready entry with the given id and display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_jurisdiction(mut self, jurisdiction: impl Into<String>) -> Self {
        self.jurisdiction = jurisdiction.into();
        self
    }

    pub fn with_status(mut self, status: DocumentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_ready(&self) -> bool {
        self.status == DocumentStatus::Ready
    }
}

/// Read access to a set of ingested documents.
///
/// Implementations must fail fast: a missing or unreadable document is an
/// error, never a retry.
pub trait Library {
    /// Look up a document's catalogue entry.
    fn get_document(&self, id: &str) -> Option<&DocumentEntry>;

    /// All catalogue entries, ordered by id.
    fn list_documents(&self) -> Vec<&DocumentEntry>;

    /// Load an independent snapshot of a document's graph.
    fn load_graph(&self, id: &str) -> Result<TripleStore>;

    /// Base URI that node identifiers in this library are built from.
    fn base_uri(&self) -> &str;
}
