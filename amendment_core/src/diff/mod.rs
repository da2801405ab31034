//! Diff Engine - resolves amendments against the statute graph.
//!
//! For each amendment in a bill:
//! 1. **Resolve**: Map the target citation to a provision URI and document id
//! 2. **Load**: Fetch the owning document snapshot (cached for this call)
//! 3. **Measure**: Read existing text, count touched facts, collect cross-references
//! 4. **Classify**: File the entry under added, removed, modified or redesignated
//!
//! Unresolvable targets are recorded, never raised.

mod cache;
mod resolve;

pub use cache::*;
pub use resolve::*;

use serde::{Deserialize, Serialize};
use std::fmt;

use statute_graph::{vocab, Library};

use crate::bill::{Amendment, AmendmentKind, Bill};
use crate::config::{AnalysisConfig, GraphConfig};
use crate::error::ResolveError;

/// How an amendment changes the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
    Redesignated,
}

impl ChangeKind {
    /// Classification of an amendment kind. Unknown kinds are treated as
    /// modifications so they are never silently dropped.
    pub fn classify(kind: AmendmentKind) -> Self {
        match kind {
            AmendmentKind::StrikeInsert | AmendmentKind::TableOfContents => ChangeKind::Modified,
            AmendmentKind::Repeal => ChangeKind::Removed,
            AmendmentKind::AddNewSection | AmendmentKind::AddAtEnd => ChangeKind::Added,
            AmendmentKind::Redesignate => ChangeKind::Redesignated,
            AmendmentKind::Other => ChangeKind::Modified,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
            ChangeKind::Redesignated => "redesignated",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One resolved amendment and what it touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub amendment: Amendment,
    pub target_uri: String,
    pub document_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_text: Option<String>,
    /// Facts with the target at either end.
    pub affected_triples: usize,
    /// Provisions that reference the target.
    pub incoming_refs: Vec<String>,
    /// Provisions the target references.
    pub outgoing_refs: Vec<String>,
}

impl DiffEntry {
    /// Proposed text, falling back to the amendment's insert text.
    pub fn proposed(&self) -> &str {
        self.proposed_text
            .as_deref()
            .or(self.amendment.insert_text.as_deref())
            .unwrap_or_default()
    }

    /// Display label of the target, e.g. `Art6502(b)`.
    pub fn target_label(&self) -> &str {
        vocab::uri_label(&self.target_uri)
    }
}

/// An amendment whose target could not be mapped onto the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedTarget {
    /// Citation form, e.g. `99 U.S.C. 1234`.
    pub description: String,
    pub reason: String,
    pub amendment: Amendment,
}

/// Resolved amendments bucketed by change kind.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Diff {
    pub bill: Bill,
    pub added: Vec<DiffEntry>,
    pub removed: Vec<DiffEntry>,
    pub modified: Vec<DiffEntry>,
    pub redesignated: Vec<DiffEntry>,
    pub unresolved: Vec<UnresolvedTarget>,
    pub triples_invalidated: usize,
}

impl Diff {
    /// Create an empty diff for a bill.
    pub fn new(bill: Bill) -> Self {
        Self {
            bill,
            ..Default::default()
        }
    }

    /// Number of resolved entries across all buckets.
    pub fn entry_count(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len() + self.redesignated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0 && self.unresolved.is_empty()
    }

    pub fn entries(&self, kind: ChangeKind) -> &[DiffEntry] {
        match kind {
            ChangeKind::Added => &self.added,
            ChangeKind::Removed => &self.removed,
            ChangeKind::Modified => &self.modified,
            ChangeKind::Redesignated => &self.redesignated,
        }
    }

    /// All entries: removed, modified, added, then redesignated.
    pub fn all_entries(&self) -> impl Iterator<Item = &DiffEntry> {
        self.removed
            .iter()
            .chain(self.modified.iter())
            .chain(self.added.iter())
            .chain(self.redesignated.iter())
    }

    fn push(&mut self, mut entry: DiffEntry) {
        let kind = ChangeKind::classify(entry.amendment.kind);
        if kind != ChangeKind::Removed {
            entry.proposed_text = entry.amendment.insert_text.clone();
        }
        self.triples_invalidated += entry.affected_triples;
        match kind {
            ChangeKind::Added => self.added.push(entry),
            ChangeKind::Removed => self.removed.push(entry),
            ChangeKind::Modified => self.modified.push(entry),
            ChangeKind::Redesignated => self.redesignated.push(entry),
        }
    }

    fn record_unresolved(&mut self, amendment: &Amendment, reason: &ResolveError) {
        let description = amendment.target.citation();
        tracing::warn!(target_ref = %description, reason = %reason, "unresolved amendment target");
        self.unresolved.push(UnresolvedTarget {
            description,
            reason: reason.to_string(),
            amendment: amendment.clone(),
        });
    }
}

/// Resolves a bill's amendments against a library.
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    config: GraphConfig,
}

impl DiffEngine {
    /// Create a new diff engine with the given graph configuration.
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    /// Create a diff engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(GraphConfig::default())
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.graph.clone())
    }

    /// Compute the diff of a bill against the library.
    ///
    /// Deterministic for a fixed bill and library state: entries follow the
    /// bill's amendment order within each bucket.
    pub fn compute(&self, bill: &Bill, library: &dyn Library) -> Diff {
        let mut diff = Diff::new(bill.clone());
        let mut cache = SnapshotCache::new(library);

        for amendment in bill.amendments() {
            let resolved = match resolve_target(amendment, library, &self.config) {
                Ok(resolved) => resolved,
                Err(reason) => {
                    diff.record_unresolved(amendment, &reason);
                    continue;
                }
            };

            let graph = match cache.get(&resolved.document_id) {
                Ok(graph) => graph,
                Err(reason) => {
                    diff.record_unresolved(amendment, &reason);
                    continue;
                }
            };

            let (incoming_refs, outgoing_refs) = find_cross_references(&resolved.uri, graph);
            let entry = DiffEntry {
                amendment: amendment.clone(),
                existing_text: graph.get_one(&resolved.uri, vocab::TEXT),
                proposed_text: None,
                affected_triples: count_affected_triples(&resolved.uri, graph),
                incoming_refs,
                outgoing_refs,
                target_uri: resolved.uri,
                document_id: resolved.document_id,
            };

            tracing::debug!(
                uri = %entry.target_uri,
                kind = %amendment.kind,
                affected = entry.affected_triples,
                "resolved amendment"
            );
            diff.push(entry);
        }

        tracing::info!(
            entries = diff.entry_count(),
            unresolved = diff.unresolved.len(),
            triples_invalidated = diff.triples_invalidated,
            "computed diff"
        );
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::TargetRef;
    use crate::testing::*;

    #[test]
    fn test_classification_is_total() {
        assert_eq!(ChangeKind::classify(AmendmentKind::StrikeInsert), ChangeKind::Modified);
        assert_eq!(ChangeKind::classify(AmendmentKind::TableOfContents), ChangeKind::Modified);
        assert_eq!(ChangeKind::classify(AmendmentKind::Repeal), ChangeKind::Removed);
        assert_eq!(ChangeKind::classify(AmendmentKind::AddNewSection), ChangeKind::Added);
        assert_eq!(ChangeKind::classify(AmendmentKind::AddAtEnd), ChangeKind::Added);
        assert_eq!(ChangeKind::classify(AmendmentKind::Redesignate), ChangeKind::Redesignated);
        assert_eq!(ChangeKind::classify(AmendmentKind::Other), ChangeKind::Modified);
    }

    #[test]
    fn test_compute_buckets_entries() {
        let library = setup_library();
        let bill = bill_with(vec![
            repeal("1"),
            strike_insert("2", "shall provide notice", "shall not provide notice"),
            add_at_end("2", "Each operator shall keep records."),
            Amendment::new(AmendmentKind::Redesignate, TargetRef::new("15", "3"))
                .with_strike_text("(3)")
                .with_insert_text("(4)"),
        ]);

        let diff = DiffEngine::with_defaults().compute(&bill, &library);

        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.modified.len(), 1);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.redesignated.len(), 1);
        assert!(diff.unresolved.is_empty());

        let removed = &diff.removed[0];
        assert_eq!(removed.target_uri, art_uri("1"));
        assert_eq!(removed.incoming_refs, vec![art_uri("2")]);
        assert!(removed.proposed_text.is_none());
        assert_eq!(
            diff.modified[0].proposed_text.as_deref(),
            Some("shall not provide notice")
        );
        assert!(diff.modified[0].existing_text.is_some());
    }

    #[test]
    fn test_unresolved_targets_are_recorded_not_raised() {
        let library = setup_library();
        let bill = bill_with(vec![
            Amendment::new(AmendmentKind::Repeal, TargetRef::new("99", "1234")),
            Amendment::new(AmendmentKind::Repeal, TargetRef::new("99", "1234").with_subsection("(b)")),
            Amendment::new(AmendmentKind::Repeal, TargetRef::title_only("15")),
            repeal("1"),
        ]);

        let diff = DiffEngine::with_defaults().compute(&bill, &library);

        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.unresolved.len(), 3);
        assert_eq!(diff.unresolved[0].description, "99 U.S.C. 1234");
        assert_eq!(diff.unresolved[1].description, "99 U.S.C. 1234(b)");
        assert!(diff.unresolved[2].reason.contains("no target section"));
    }

    #[test]
    fn test_unready_document_is_unresolved() {
        let library = setup_library().with_document(
            statute_graph::DocumentEntry::new("us-usc-title-20", "Title 20")
                .with_status(statute_graph::DocumentStatus::Failed),
            statute_graph::TripleStore::new(),
        );
        let bill = bill_with(vec![Amendment::new(
            AmendmentKind::Repeal,
            TargetRef::new("20", "1"),
        )]);

        let diff = DiffEngine::with_defaults().compute(&bill, &library);
        assert_eq!(diff.unresolved.len(), 1);
        assert!(diff.unresolved[0].reason.contains("failed to load"));
    }

    #[test]
    fn test_compute_is_deterministic() {
        let library = setup_library();
        let bill = bill_with(vec![repeal("1"), repeal("2"), add_at_end("9", "new text")]);
        let engine = DiffEngine::with_defaults();

        let first = engine.compute(&bill, &library);
        let second = engine.compute(&bill, &library);

        assert_eq!(first.removed, second.removed);
        assert_eq!(first.added, second.added);
        assert_eq!(first.triples_invalidated, second.triples_invalidated);
    }
}
