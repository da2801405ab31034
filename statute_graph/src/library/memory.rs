//! In-memory library, used for tests and for callers that build graphs on the fly.

use std::collections::BTreeMap;

use super::{DocumentEntry, Library};
use crate::error::{GraphError, Result};
use crate::store::TripleStore;
use crate::vocab;

/// A library whose documents live entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryLibrary {
    base_uri: String,
    documents: BTreeMap<String, (DocumentEntry, TripleStore)>,
}

impl MemoryLibrary {
    /// Create an empty library with the given base URI.
    pub fn new(base_uri: &str) -> Self {
        Self {
            base_uri: vocab::normalize_base_uri(base_uri),
            documents: BTreeMap::new(),
        }
    }

    /// Create an empty library using the default base URI.
    pub fn with_defaults() -> Self {
        Self::new(vocab::DEFAULT_BASE_URI)
    }

    /// Builder form of [`MemoryLibrary::add_document`].
    pub fn with_document(mut self, entry: DocumentEntry, graph: TripleStore) -> Self {
        self.add_document(entry, graph);
        self
    }

    /// Register a document, replacing any existing one with the same id.
    pub fn add_document(&mut self, mut entry: DocumentEntry, graph: TripleStore) {
        entry.triple_count = graph.count();
        self.documents.insert(entry.id.clone(), (entry, graph));
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl Default for MemoryLibrary {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Library for MemoryLibrary {
    fn get_document(&self, id: &str) -> Option<&DocumentEntry> {
        self.documents.get(id).map(|(entry, _)| entry)
    }

    fn list_documents(&self) -> Vec<&DocumentEntry> {
        self.documents.values().map(|(entry, _)| entry).collect()
    }

    fn load_graph(&self, id: &str) -> Result<TripleStore> {
        let (entry, graph) = self
            .documents
            .get(id)
            .ok_or_else(|| GraphError::DocumentNotFound(id.to_string()))?;

        if !entry.is_ready() {
            return Err(GraphError::DocumentNotReady {
                id: id.to_string(),
                status: entry.status.to_string(),
            });
        }

        Ok(graph.clone())
    }

    fn base_uri(&self) -> &str {
        &self.base_uri
    }
}
