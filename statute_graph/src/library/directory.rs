//! On-disk library stored as a directory of JSON files.
//!
//! Layout:
//!
//! ```text
//! <root>/library.json                 manifest (base URI + document entries)
//! <root>/documents/<id>/triples.json  flat list of triples per document
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{DocumentEntry, Library};
use crate::error::{GraphError, Result};
use crate::store::TripleStore;
use crate::vocab;

const MANIFEST_FILE: &str = "library.json";
const DOCUMENTS_DIR: &str = "documents";
const TRIPLES_FILE: &str = "triples.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct Manifest {
    base_uri: String,
    #[serde(default)]
    documents: BTreeMap<String, DocumentEntry>,
}

/// A library persisted under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryLibrary {
    root: PathBuf,
    manifest: Manifest,
}

impl DirectoryLibrary {
    /// Create a new, empty library at `root`, writing its manifest.
    pub fn init(root: impl AsRef<Path>, base_uri: &str) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(DOCUMENTS_DIR))
            .map_err(|source| GraphError::io(&root, source))?;

        let library = Self {
            root,
            manifest: Manifest {
                base_uri: vocab::normalize_base_uri(base_uri),
                documents: BTreeMap::new(),
            },
        };
        library.write_manifest()?;

        tracing::info!(root = %library.root.display(), "initialized library");
        Ok(library)
    }

    /// Open an existing library. A missing or unreadable manifest is an error.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let manifest_path = root.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(GraphError::ManifestMissing(manifest_path));
        }

        let raw = fs::read_to_string(&manifest_path)
            .map_err(|source| GraphError::io(&manifest_path, source))?;
        let mut manifest: Manifest =
            serde_json::from_str(&raw).map_err(|source| GraphError::json(&manifest_path, source))?;
        manifest.base_uri = vocab::normalize_base_uri(&manifest.base_uri);

        tracing::debug!(
            root = %root.display(),
            documents = manifest.documents.len(),
            "opened library"
        );
        Ok(Self { root, manifest })
    }

    /// Persist a document's graph and register it in the manifest.
    pub fn add_document(&mut self, mut entry: DocumentEntry, graph: &TripleStore) -> Result<()> {
        let doc_dir = self.root.join(DOCUMENTS_DIR).join(&entry.id);
        fs::create_dir_all(&doc_dir).map_err(|source| GraphError::io(&doc_dir, source))?;

        let triples_path = doc_dir.join(TRIPLES_FILE);
        let json = serde_json::to_string_pretty(graph)
            .map_err(|source| GraphError::json(&triples_path, source))?;
        fs::write(&triples_path, json).map_err(|source| GraphError::io(&triples_path, source))?;

        entry.triple_count = graph.count();
        self.manifest.documents.insert(entry.id.clone(), entry);
        self.write_manifest()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn write_manifest(&self) -> Result<()> {
        let path = self.root.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(&self.manifest)
            .map_err(|source| GraphError::json(&path, source))?;
        fs::write(&path, json).map_err(|source| GraphError::io(&path, source))
    }
}

impl Library for DirectoryLibrary {
    fn get_document(&self, id: &str) -> Option<&DocumentEntry> {
        self.manifest.documents.get(id)
    }

    fn list_documents(&self) -> Vec<&DocumentEntry> {
        self.manifest.documents.values().collect()
    }

    fn load_graph(&self, id: &str) -> Result<TripleStore> {
        let entry = self
            .get_document(id)
            .ok_or_else(|| GraphError::DocumentNotFound(id.to_string()))?;
        if !entry.is_ready() {
            return Err(GraphError::DocumentNotReady {
                id: id.to_string(),
                status: entry.status.to_string(),
            });
        }

        let path = self.root.join(DOCUMENTS_DIR).join(id).join(TRIPLES_FILE);
        let raw = fs::read_to_string(&path).map_err(|source| GraphError::io(&path, source))?;
        serde_json::from_str(&raw).map_err(|source| GraphError::json(&path, source))
    }

    fn base_uri(&self) -> &str {
        &self.manifest.base_uri
    }
}
