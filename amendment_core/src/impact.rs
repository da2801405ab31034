//! Impact Analyzer - which provisions a bill reaches, directly or transitively.
//!
//! The analysis runs in two passes:
//! 1. **Traverse**: For each modified, then each removed entry, walk
//!    cross-references in both directions up to the requested depth
//! 2. **Merge**: Collect every entry's direct hits, then every entry's
//!    transitive hits, keeping the first classification of each node
//!
//! Because all direct hits are merged before any transitive ones, a node is
//! never reported in both sets, and a deeper walk only ever adds nodes.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use statute_graph::{vocab, Direction, Library, ReachedNode, TripleStore};

use crate::config::{AnalysisConfig, GraphConfig, ImpactConfig};
use crate::crossref::{BrokenReference, BrokenReferenceDetector};
use crate::diff::{Diff, DiffEntry, SnapshotCache};
use crate::overlay::ProvisionIngester;

/// A provision reached from a changed target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedProvision {
    pub uri: String,
    pub label: String,
    pub document_id: String,
    /// 1 for a direct reference, greater for transitive reach.
    pub depth: u32,
    pub reason: String,
}

/// Obligation URIs added, removed or modified by a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ObligationDelta {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<String>,
}

/// Right URIs added, removed or modified by a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RightsDelta {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<String>,
}

/// Impact of a whole bill, deduplicated across its amendments.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BillImpact {
    pub directly_affected: Vec<AffectedProvision>,
    pub transitively_affected: Vec<AffectedProvision>,
    pub broken_references: Vec<BrokenReference>,
    pub obligation_changes: ObligationDelta,
    pub rights_changes: RightsDelta,
    pub total_affected: usize,
    pub max_depth_reached: u32,
}

impl BillImpact {
    /// Sort both affected sets by depth, then URI.
    pub fn sort_by_depth(&mut self) {
        for provisions in [&mut self.directly_affected, &mut self.transitively_affected] {
            provisions.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.uri.cmp(&b.uri)));
        }
    }

    pub fn all_affected(&self) -> impl Iterator<Item = &AffectedProvision> {
        self.directly_affected
            .iter()
            .chain(self.transitively_affected.iter())
    }
}

/// Computes the transitive impact of a diff.
#[derive(Debug, Clone, Default)]
pub struct ImpactAnalyzer {
    config: ImpactConfig,
    graph: GraphConfig,
    detector: BrokenReferenceDetector,
    ingester: ProvisionIngester,
}

impl ImpactAnalyzer {
    /// Create a new impact analyzer with the given configuration.
    pub fn new(config: ImpactConfig) -> Self {
        Self {
            config,
            graph: GraphConfig::default(),
            detector: BrokenReferenceDetector::new(),
            ingester: ProvisionIngester::with_defaults(),
        }
    }

    /// Create an impact analyzer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ImpactConfig::default())
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            graph: config.graph.clone(),
            ..Self::new(config.impact.clone())
        }
    }

    /// Analyze at the configured default depth.
    pub fn analyze_default(&self, diff: &Diff, library: &dyn Library) -> BillImpact {
        self.analyze(diff, library, self.config.max_depth)
    }

    /// Analyze impact up to `depth` levels (clamped to at least 1).
    pub fn analyze(&self, diff: &Diff, library: &dyn Library, depth: u32) -> BillImpact {
        let depth = depth.max(1);
        let mut cache = SnapshotCache::new(library);
        let mut impact = BillImpact::default();

        // Pass 1: traverse each changed target
        let mut direct = Vec::new();
        let mut transitive = Vec::new();
        let changed = diff
            .modified
            .iter()
            .map(|entry| (entry, "modified"))
            .chain(diff.removed.iter().map(|entry| (entry, "repealed")));

        for (entry, change) in changed {
            let graph = match cache.get(&entry.document_id) {
                Ok(graph) => &*graph,
                Err(err) => {
                    tracing::warn!(uri = %entry.target_uri, reason = %err, "skipping impact traversal");
                    continue;
                }
            };

            let traversal = graph.traverse(&entry.target_uri, depth, Direction::Both);
            tracing::debug!(
                uri = %entry.target_uri,
                reached = traversal.len(),
                "traversed changed provision"
            );

            let label = entry.target_label();
            direct.extend(traversal.direct_incoming.iter().map(|node| {
                affected(node, graph, entry, format!("references {change} {label}"))
            }));
            transitive.extend(traversal.transitive.iter().map(|node| {
                affected(node, graph, entry, format!("transitively linked via {change} {label}"))
            }));

            let (obligations, rights) = semantic_links(&entry.target_uri, graph);
            if change == "modified" {
                impact.obligation_changes.modified.extend(obligations);
                impact.rights_changes.modified.extend(rights);
            } else {
                impact.obligation_changes.removed.extend(obligations);
                impact.rights_changes.removed.extend(rights);
            }
        }

        // Pass 2: merge, first classification wins
        let mut seen = HashSet::new();
        impact.directly_affected = direct
            .into_iter()
            .filter(|provision| seen.insert(provision.uri.clone()))
            .collect();
        impact.transitively_affected = transitive
            .into_iter()
            .filter(|provision| seen.insert(provision.uri.clone()))
            .collect();

        // New provisions have no incoming references; they only add semantics
        for entry in &diff.added {
            let (obligations, rights) = self.proposed_semantics(entry, library.base_uri());
            impact.obligation_changes.added.extend(obligations);
            impact.rights_changes.added.extend(rights);
        }

        impact.broken_references = self.detector.detect_cached(diff, &mut cache);
        impact.total_affected = impact.directly_affected.len() + impact.transitively_affected.len();
        impact.max_depth_reached = impact.all_affected().map(|p| p.depth).max().unwrap_or(0);

        tracing::info!(
            direct = impact.directly_affected.len(),
            transitive = impact.transitively_affected.len(),
            broken = impact.broken_references.len(),
            depth,
            "analyzed impact"
        );
        impact
    }

    /// Obligations and rights the added provision would carry once ingested.
    fn proposed_semantics(&self, entry: &DiffEntry, base_uri: &str) -> (Vec<String>, Vec<String>) {
        let mut scratch = TripleStore::new();
        let base_uri = match base_uri {
            "" => self.graph.base_uri.as_str(),
            base_uri => base_uri,
        };

        if let Err(err) = self
            .ingester
            .ingest(&entry.amendment, &mut scratch, base_uri, &entry.document_id)
        {
            tracing::warn!(uri = %entry.target_uri, reason = %err, "could not read proposed provision");
            return (Vec::new(), Vec::new());
        }
        semantic_links(&entry.target_uri, &scratch)
    }
}

fn affected(node: &ReachedNode, graph: &TripleStore, entry: &DiffEntry, reason: String) -> AffectedProvision {
    AffectedProvision {
        uri: node.uri.clone(),
        label: graph.label_for(&node.uri),
        document_id: entry.document_id.clone(),
        depth: node.depth,
        reason,
    }
}

/// Obligations imposed and rights granted by a provision.
fn semantic_links(uri: &str, graph: &TripleStore) -> (Vec<String>, Vec<String>) {
    (
        graph.objects(uri, vocab::IMPOSES_OBLIGATION),
        graph.objects(uri, vocab::GRANTS_RIGHT),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::Amendment;
    use crate::diff::DiffEngine;
    use crate::testing::*;

    fn analyze(amendments: Vec<Amendment>, depth: u32) -> BillImpact {
        let library = setup_library();
        let diff = DiffEngine::with_defaults().compute(&bill_with(amendments), &library);
        ImpactAnalyzer::with_defaults().analyze(&diff, &library, depth)
    }

    #[test]
    fn test_repeal_lists_direct_reference() {
        let impact = analyze(vec![repeal("1")], 1);

        assert_eq!(impact.directly_affected.len(), 1);
        let direct = &impact.directly_affected[0];
        assert_eq!(direct.uri, art_uri("2"));
        assert_eq!(direct.depth, 1);
        assert_eq!(direct.reason, "references repealed Art1");
        assert!(impact.transitively_affected.is_empty());
        assert_eq!(impact.broken_references.len(), 1);
        assert_eq!(
            impact.obligation_changes.removed,
            vec![obligation_uri("1", "InformationProvisionObligation")]
        );
    }

    #[test]
    fn test_depth_zero_is_clamped() {
        let impact = analyze(vec![repeal("1")], 0);
        assert_eq!(impact.directly_affected.len(), 1);
        assert!(impact.transitively_affected.is_empty());
    }

    #[test]
    fn test_transitive_reach() {
        let impact = analyze(vec![repeal("1")], 3);

        assert_eq!(impact.transitively_affected.len(), 1);
        let transitive = &impact.transitively_affected[0];
        assert_eq!(transitive.uri, art_uri("3"));
        assert_eq!(transitive.depth, 2);
        assert_eq!(transitive.reason, "transitively linked via repealed Art1");
        assert_eq!(impact.total_affected, 2);
        assert_eq!(impact.max_depth_reached, 2);
    }

    #[test]
    fn test_no_node_is_both_direct_and_transitive() {
        // Art3 is transitive from Art1 but direct from Art2
        let impact = analyze(vec![strike_insert("2", "a", "b"), repeal("1")], 3);

        let direct: HashSet<_> = impact.directly_affected.iter().map(|p| &p.uri).collect();
        let transitive: HashSet<_> = impact.transitively_affected.iter().map(|p| &p.uri).collect();
        assert!(direct.is_disjoint(&transitive));
        assert!(direct.contains(&art_uri("3")));
    }

    #[test]
    fn test_deeper_analysis_only_adds() {
        let amendments = vec![repeal("1"), strike_insert("4", "access", "review")];
        let shallow = analyze(amendments.clone(), 1);
        let deep = analyze(amendments, 4);

        for provision in shallow.all_affected() {
            assert!(deep.all_affected().any(|p| p.uri == provision.uri));
        }
        assert!(deep.total_affected >= shallow.total_affected);
    }

    #[test]
    fn test_added_entries_contribute_semantics_only() {
        let impact = analyze(
            vec![add_at_end("9", "A consumer has the right to data portability.")],
            3,
        );

        assert_eq!(impact.total_affected, 0);
        assert_eq!(
            impact.rights_changes.added,
            vec![right_uri("9", "RightToDataPortability")]
        );
    }

    #[test]
    fn test_sort_by_depth() {
        let mut impact = BillImpact {
            transitively_affected: vec![
                AffectedProvision {
                    uri: "b".into(),
                    label: "b".into(),
                    document_id: DOC.into(),
                    depth: 3,
                    reason: String::new(),
                },
                AffectedProvision {
                    uri: "a".into(),
                    label: "a".into(),
                    document_id: DOC.into(),
                    depth: 2,
                    reason: String::new(),
                },
            ],
            ..Default::default()
        };
        impact.sort_by_depth();
        assert_eq!(impact.transitively_affected[0].uri, "a");
    }
}
