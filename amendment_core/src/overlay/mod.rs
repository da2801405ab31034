//! Overlay Engine - a non-destructive "proposed law" view of the graph.
//!
//! Only documents touched by the diff are cloned. Changes are applied to the
//! clones in a fixed order (removed, modified, added, redesignated) and the
//! clones are merged into one overlay store. The library is never written.

mod ingest;

pub use ingest::*;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use statute_graph::{vocab, Library, TripleStore};

use crate::bill::Amendment;
use crate::config::{AnalysisConfig, GraphConfig};
use crate::diff::{Diff, DiffEntry, SnapshotCache};

/// An amendment the overlay could not apply, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedAmendment {
    pub amendment: Amendment,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OverlayStats {
    pub triples_removed: usize,
    pub triples_added: usize,
    /// Triples in the touched documents before any change.
    pub base_triples: usize,
    pub overlay_triples: usize,
}

/// The graph as it would read if the bill were enacted.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScenarioOverlay {
    pub store: TripleStore,
    pub applied: Vec<Amendment>,
    pub skipped: Vec<SkippedAmendment>,
    pub stats: OverlayStats,
}

/// Applies a diff to cloned document snapshots.
#[derive(Debug, Clone, Default)]
pub struct OverlayEngine {
    config: GraphConfig,
    ingester: ProvisionIngester,
}

impl OverlayEngine {
    /// Create a new overlay engine with the given graph configuration.
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            ingester: ProvisionIngester::with_defaults(),
        }
    }

    /// Create an overlay engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(GraphConfig::default())
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.graph.clone())
    }

    /// Use a custom ingester (for example with different extractors).
    pub fn with_ingester(mut self, ingester: ProvisionIngester) -> Self {
        self.ingester = ingester;
        self
    }

    /// Apply `diff` to clones of the documents it touches.
    pub fn apply(&self, diff: &Diff, library: &dyn Library) -> ScenarioOverlay {
        let base_uri = match library.base_uri() {
            "" => self.config.base_uri.clone(),
            base => base.to_string(),
        };

        let mut overlay = ScenarioOverlay::default();
        let mut cache = SnapshotCache::new(library);

        for entry in &diff.removed {
            self.apply_entry(entry, &mut cache, &mut overlay, |graph| {
                Ok((repeal(&entry.target_uri, graph), 0))
            });
        }

        for entry in &diff.modified {
            self.apply_entry(entry, &mut cache, &mut overlay, |graph| {
                let removed = repeal(&entry.target_uri, graph);
                let added =
                    self.ingester
                        .ingest(&entry.amendment, graph, &base_uri, &entry.document_id)?;
                Ok((removed, added))
            });
        }

        for entry in &diff.added {
            self.apply_entry(entry, &mut cache, &mut overlay, |graph| {
                let added =
                    self.ingester
                        .ingest(&entry.amendment, graph, &base_uri, &entry.document_id)?;
                Ok((0, added))
            });
        }

        for entry in &diff.redesignated {
            self.apply_entry(entry, &mut cache, &mut overlay, |graph| {
                Ok((0, redesignate(entry, graph)?))
            });
        }

        overlay.stats.base_triples = cache.loaded_triples();
        for (_, snapshot) in cache.into_snapshots() {
            overlay.store.merge_from(&snapshot);
        }
        overlay.stats.overlay_triples = overlay.store.count();

        tracing::info!(
            applied = overlay.applied.len(),
            skipped = overlay.skipped.len(),
            removed = overlay.stats.triples_removed,
            added = overlay.stats.triples_added,
            "applied overlay"
        );
        overlay
    }

    /// Run one change against its document clone, recording the outcome.
    fn apply_entry(
        &self,
        entry: &DiffEntry,
        cache: &mut SnapshotCache<'_>,
        overlay: &mut ScenarioOverlay,
        change: impl FnOnce(&mut TripleStore) -> statute_graph::Result<(usize, usize)>,
    ) {
        let outcome = cache
            .get(&entry.document_id)
            .map_err(|err| format!("failed to load store: {err}"))
            .and_then(|graph| {
                change(graph).map_err(|err| {
                    format!("failed to apply {}: {err}", entry.amendment.kind)
                })
            });

        match outcome {
            Ok((removed, added)) => {
                overlay.stats.triples_removed += removed;
                overlay.stats.triples_added += added;
                overlay.applied.push(entry.amendment.clone());
            }
            Err(reason) => {
                tracing::warn!(uri = %entry.target_uri, reason = %reason, "skipping amendment in overlay");
                overlay.skipped.push(SkippedAmendment {
                    amendment: entry.amendment.clone(),
                    reason,
                });
            }
        }
    }
}

/// Remove every fact touching the target and everything nested under it
/// (via `contains` or `partOf`). Returns the number of facts removed.
pub fn repeal(target_uri: &str, graph: &mut TripleStore) -> usize {
    let nested = nested_uris(target_uri, graph);

    let mut removed = graph.delete(target_uri, "", "") + graph.delete("", "", target_uri);
    for uri in &nested {
        removed += graph.delete(uri, "", "") + graph.delete("", "", uri);
    }
    removed
}

/// Nodes reachable from `target_uri` through containment, in discovery order.
/// Cycles are tolerated.
pub fn nested_uris(target_uri: &str, graph: &TripleStore) -> Vec<String> {
    let mut visited: HashSet<String> = HashSet::from([target_uri.to_string()]);
    let mut nested = Vec::new();
    let mut stack = vec![target_uri.to_string()];

    while let Some(uri) = stack.pop() {
        let children = graph
            .objects(&uri, vocab::CONTAINS)
            .into_iter()
            .chain(graph.subjects(vocab::PART_OF, &uri));

        for child in children {
            if visited.insert(child.clone()) {
                nested.push(child.clone());
                stack.push(child);
            }
        }
    }

    nested
}

/// Rewrite the target's number. Content is untouched.
fn redesignate(entry: &DiffEntry, graph: &mut TripleStore) -> statute_graph::Result<usize> {
    let Some(new_number) = entry.amendment.insert_text.as_deref() else {
        return Ok(0);
    };
    graph.delete(&entry.target_uri, vocab::NUMBER, "");
    graph.add(&entry.target_uri, vocab::NUMBER, new_number)?;
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::{AmendmentKind, TargetRef};
    use crate::diff::DiffEngine;
    use crate::testing::*;
    use crate::testing::repeal;

    fn setup_overlay(amendments: Vec<Amendment>) -> (ScenarioOverlay, statute_graph::MemoryLibrary) {
        let library = setup_library();
        let diff = DiffEngine::with_defaults().compute(&bill_with(amendments), &library);
        (OverlayEngine::with_defaults().apply(&diff, &library), library)
    }

    #[test]
    fn test_repeal_cascades_through_containment() {
        let (overlay, _) = setup_overlay(vec![repeal("1")]);

        let article = art_uri("1");
        let obligation = obligation_uri("1", "InformationProvisionObligation");
        assert!(overlay.store.find(&article, "", "").is_empty());
        assert!(overlay.store.find("", "", &article).is_empty());
        assert!(overlay.store.find(&obligation, "", "").is_empty());
        assert_eq!(overlay.applied.len(), 1);
        assert!(overlay.stats.triples_removed > 0);
    }

    #[test]
    fn test_source_library_is_untouched() {
        let (overlay, library) = setup_overlay(vec![repeal("1")]);
        let source = library.load_graph(DOC).unwrap();

        assert_eq!(source.count(), setup_graph().count());
        assert_eq!(overlay.stats.base_triples, source.count());
        assert!(overlay.stats.overlay_triples < source.count());
    }

    #[test]
    fn test_modification_replaces_content() {
        let (overlay, _) = setup_overlay(vec![strike_insert(
            "2",
            "confidential",
            "The operator shall maintain records.",
        )]);

        let article = art_uri("2");
        assert_eq!(
            overlay.store.get_one(&article, vocab::TEXT).as_deref(),
            Some("The operator shall maintain records.")
        );
        assert!(overlay.store.contains(
            &article,
            vocab::IMPOSES_OBLIGATION,
            &obligation_uri("2", "RecordKeepingObligation")
        ));
        // The old outgoing reference went with the repealed facts
        assert!(!overlay.store.contains(&article, vocab::REFERENCES, &art_uri("1")));
    }

    #[test]
    fn test_redesignation_rewrites_number_only() {
        let (overlay, _) = setup_overlay(vec![Amendment::new(
            AmendmentKind::Redesignate,
            TargetRef::new("15", "3"),
        )
        .with_strike_text("(3)")
        .with_insert_text("(4)")]);

        let article = art_uri("3");
        assert_eq!(overlay.store.get_one(&article, vocab::NUMBER).as_deref(), Some("(4)"));
        assert!(overlay.store.get_one(&article, vocab::TEXT).is_some());
        assert_eq!(overlay.stats.triples_added, 1);
    }

    #[test]
    fn test_nested_uris_tolerate_cycles() {
        let mut graph = TripleStore::new();
        graph.add("a", vocab::CONTAINS, "b").unwrap();
        graph.add("b", vocab::CONTAINS, "a").unwrap();
        graph.add("c", vocab::PART_OF, "b").unwrap();

        let nested = nested_uris("a", &graph);
        assert_eq!(nested, vec!["b", "c"]);
    }

    #[test]
    fn test_clone_round_trip() {
        let graph = setup_graph();
        let mut clone = graph.clone();
        assert_eq!(clone.count(), graph.count());

        super::repeal(&art_uri("1"), &mut clone);
        assert_eq!(graph.count(), setup_graph().count());
        assert!(clone.count() < graph.count());
    }
}
