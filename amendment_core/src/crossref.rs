//! Broken Reference Detector - cross-references invalidated by a bill.
//!
//! Severity follows the amendment kind: a repealed or redesignated target
//! breaks every incoming reference outright, a struck-and-replaced target may
//! have shifted meaning, and additive changes are informational.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use statute_graph::{vocab, Library, TripleStore};

use crate::bill::AmendmentKind;
use crate::diff::{Diff, DiffEntry, SnapshotCache};
use crate::finding::Severity;

/// A reference from `source` to a changed `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenReference {
    pub source_uri: String,
    pub source_label: String,
    pub source_document_id: String,
    pub target_uri: String,
    pub target_label: String,
    pub severity: Severity,
    pub predicate: String,
    pub reason: String,
}

/// Severity of the breakage an amendment kind causes.
pub fn break_severity(kind: AmendmentKind) -> Severity {
    match kind {
        AmendmentKind::Repeal | AmendmentKind::Redesignate => Severity::Error,
        AmendmentKind::StrikeInsert | AmendmentKind::Other => Severity::Warning,
        AmendmentKind::AddAtEnd | AmendmentKind::AddNewSection | AmendmentKind::TableOfContents => {
            Severity::Info
        }
    }
}

/// Reason wording for an amendment kind.
pub fn reason_prefix(kind: AmendmentKind) -> &'static str {
    match kind {
        AmendmentKind::Repeal => "target repealed",
        AmendmentKind::Redesignate => "target redesignated",
        AmendmentKind::StrikeInsert => "target substantially modified",
        AmendmentKind::AddAtEnd => "target extended",
        AmendmentKind::AddNewSection => "target section added",
        AmendmentKind::TableOfContents => "target table of contents updated",
        AmendmentKind::Other => "target modified",
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BrokenReferenceDetector;

impl BrokenReferenceDetector {
    pub fn new() -> Self {
        Self
    }

    /// Find references broken by `diff`, errors first.
    pub fn detect(&self, diff: &Diff, library: &dyn Library) -> Vec<BrokenReference> {
        let mut cache = SnapshotCache::new(library);
        self.detect_cached(diff, &mut cache)
    }

    /// Same as [`detect`](Self::detect), sharing an existing snapshot cache.
    pub fn detect_cached(&self, diff: &Diff, cache: &mut SnapshotCache<'_>) -> Vec<BrokenReference> {
        let mut broken = Vec::new();

        let scanned = diff
            .removed
            .iter()
            .chain(diff.modified.iter())
            .chain(diff.redesignated.iter());

        for entry in scanned {
            match cache.get(&entry.document_id) {
                Ok(graph) => broken.extend(incoming_references(entry, graph)),
                Err(err) => {
                    tracing::warn!(uri = %entry.target_uri, reason = %err, "skipping broken reference scan");
                }
            }
        }

        sort_broken_references(&mut broken);
        broken
    }
}

/// Every provision pointing at the entry's target through `references`, the
/// inverse `referencedBy`, or a typed reference predicate.
fn incoming_references(entry: &DiffEntry, graph: &TripleStore) -> Vec<BrokenReference> {
    let severity = break_severity(entry.amendment.kind);
    let prefix = reason_prefix(entry.amendment.kind);
    let target_label = entry.target_label().to_string();

    let mut sources: Vec<(String, &'static str)> = graph
        .subjects(vocab::REFERENCES, &entry.target_uri)
        .into_iter()
        .chain(graph.objects(&entry.target_uri, vocab::REFERENCED_BY))
        .map(|source| (source, vocab::REFERENCES))
        .collect();
    for predicate in vocab::TYPED_REFERENCES {
        sources.extend(
            graph
                .subjects(predicate, &entry.target_uri)
                .into_iter()
                .map(|source| (source, predicate)),
        );
    }

    let mut seen = HashSet::new();
    sources
        .into_iter()
        .filter(|(source, _)| seen.insert(source.clone()))
        .map(|(source, predicate)| BrokenReference {
            source_label: graph.label_for(&source),
            source_uri: source,
            source_document_id: entry.document_id.clone(),
            target_uri: entry.target_uri.clone(),
            target_label: target_label.clone(),
            severity,
            predicate: predicate.to_string(),
            reason: format!("{prefix} §{target_label}"),
        })
        .collect()
}

/// Severity first, then source URI.
pub fn sort_broken_references(references: &mut [BrokenReference]) {
    references.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| a.source_uri.cmp(&b.source_uri))
            .then_with(|| a.target_uri.cmp(&b.target_uri))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DiffEngine;
    use crate::testing::*;

    fn detect(amendments: Vec<crate::bill::Amendment>) -> Vec<BrokenReference> {
        let library = setup_library();
        let diff = DiffEngine::with_defaults().compute(&bill_with(amendments), &library);
        BrokenReferenceDetector::new().detect(&diff, &library)
    }

    #[test]
    fn test_severity_is_total() {
        assert_eq!(break_severity(AmendmentKind::Repeal), Severity::Error);
        assert_eq!(break_severity(AmendmentKind::Redesignate), Severity::Error);
        assert_eq!(break_severity(AmendmentKind::StrikeInsert), Severity::Warning);
        assert_eq!(break_severity(AmendmentKind::Other), Severity::Warning);
        assert_eq!(break_severity(AmendmentKind::AddAtEnd), Severity::Info);
        assert_eq!(break_severity(AmendmentKind::AddNewSection), Severity::Info);
        assert_eq!(break_severity(AmendmentKind::TableOfContents), Severity::Info);
    }

    #[test]
    fn test_repeal_breaks_incoming_reference() {
        let broken = detect(vec![repeal("1")]);

        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].source_uri, art_uri("2"));
        assert_eq!(broken[0].target_uri, art_uri("1"));
        assert_eq!(broken[0].severity, Severity::Error);
        assert_eq!(broken[0].reason, "target repealed §Art1");
        assert_eq!(broken[0].source_label, "Art2");
    }

    #[test]
    fn test_strike_insert_is_a_warning() {
        let broken = detect(vec![strike_insert("2", "records", "files")]);
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].severity, Severity::Warning);
        assert_eq!(broken[0].source_uri, art_uri("3"));
        assert!(broken[0].reason.starts_with("target substantially modified"));
    }

    #[test]
    fn test_inverse_and_typed_references_are_deduplicated() {
        let mut graph = setup_graph();
        graph.add(art_uri("1"), vocab::REFERENCED_BY, art_uri("2")).unwrap();
        graph.add(art_uri("4"), vocab::REFERS_TO_ARTICLE, art_uri("1")).unwrap();
        graph.add(art_uri("4"), vocab::TITLE, "Access rights").unwrap();
        let library = library_with(graph);

        let diff = DiffEngine::with_defaults().compute(&bill_with(vec![repeal("1")]), &library);
        let broken = BrokenReferenceDetector::new().detect(&diff, &library);

        assert_eq!(broken.len(), 2);
        assert_eq!(broken[1].source_uri, art_uri("4"));
        assert_eq!(broken[1].predicate, vocab::REFERS_TO_ARTICLE);
        assert_eq!(broken[1].source_label, "Access rights");
    }

    #[test]
    fn test_sorted_errors_first() {
        let broken = detect(vec![strike_insert("2", "a", "b"), repeal("1")]);
        assert_eq!(broken.len(), 2);
        assert_eq!(broken[0].severity, Severity::Error);
        assert_eq!(broken[1].severity, Severity::Warning);
    }

    #[test]
    fn test_additions_are_not_scanned() {
        assert!(detect(vec![add_at_end("1", "more text")]).is_empty());
    }
}
