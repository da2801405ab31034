//! Per-call cache of document snapshots.

use std::collections::HashMap;

use statute_graph::{Library, TripleStore};

use crate::error::ResolveError;

/// Loads each document at most once for the lifetime of one analysis call.
///
/// Failed loads are not cached, so every amendment against a broken document
/// records its own skip reason.
pub struct SnapshotCache<'a> {
    library: &'a dyn Library,
    snapshots: HashMap<String, TripleStore>,
    loaded_triples: usize,
}

impl<'a> SnapshotCache<'a> {
    /// Create an empty cache over a library.
    pub fn new(library: &'a dyn Library) -> Self {
        Self {
            library,
            snapshots: HashMap::new(),
            loaded_triples: 0,
        }
    }

    pub fn library(&self) -> &'a dyn Library {
        self.library
    }

    /// Get a document's snapshot, loading it on first use.
    pub fn get(&mut self, document_id: &str) -> Result<&mut TripleStore, ResolveError> {
        if !self.snapshots.contains_key(document_id) {
            let snapshot =
                self.library
                    .load_graph(document_id)
                    .map_err(|err| ResolveError::LoadFailed {
                        id: document_id.to_string(),
                        reason: err.to_string(),
                    })?;
            tracing::debug!(document = document_id, triples = snapshot.count(), "loaded snapshot");
            self.loaded_triples += snapshot.count();
            self.snapshots.insert(document_id.to_string(), snapshot);
        }

        self.snapshots
            .get_mut(document_id)
            .ok_or_else(|| ResolveError::DocumentNotFound(document_id.to_string()))
    }

    /// Number of documents loaded so far.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Triples across all snapshots as they were when loaded.
    pub fn loaded_triples(&self) -> usize {
        self.loaded_triples
    }

    /// Consume the cache, yielding snapshots ordered by document id.
    pub fn into_snapshots(self) -> Vec<(String, TripleStore)> {
        let mut snapshots: Vec<_> = self.snapshots.into_iter().collect();
        snapshots.sort_by(|a, b| a.0.cmp(&b.0));
        snapshots
    }
}
