//! Conflict Detector - semantic clashes between a bill and existing law.
//!
//! Obligations and rights are compared per diff bucket:
//! 1. **Modified**: proposed text against the target's obligations
//!    (contradiction) and rights (narrowing)
//! 2. **Removed**: obligations and rights still depended on through the
//!    target (orphaned obligation, repealed right)
//! 3. **Added**: proposed obligations against every existing obligation
//!    (duplicate), proposed rights against obligation types (contradiction)
//!    and against existing right types (expansion)
//!
//! Findings are sorted by severity, then type, then the implicated provision.

mod directive;
mod rights;

pub use directive::*;
pub use rights::*;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use statute_graph::{vocab, Library, TripleStore};

use crate::bill::Amendment;
use crate::config::{AnalysisConfig, ConflictConfig};
use crate::diff::{Diff, DiffEntry, SnapshotCache};
use crate::finding::Severity;

/// Closed set of conflict kinds, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    ObligationContradiction,
    ObligationDuplicate,
    ObligationOrphaned,
    RightsNarrowing,
    RightsContradiction,
    RightsExpansion,
}

impl ConflictType {
    pub const ALL: [ConflictType; 6] = [
        ConflictType::ObligationContradiction,
        ConflictType::ObligationDuplicate,
        ConflictType::ObligationOrphaned,
        ConflictType::RightsNarrowing,
        ConflictType::RightsContradiction,
        ConflictType::RightsExpansion,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            ConflictType::ObligationContradiction => "obligation_contradiction",
            ConflictType::ObligationDuplicate => "obligation_duplicate",
            ConflictType::ObligationOrphaned => "obligation_orphaned",
            ConflictType::RightsNarrowing => "rights_narrowing",
            ConflictType::RightsContradiction => "rights_contradiction",
            ConflictType::RightsExpansion => "rights_expansion",
        }
    }

    /// Label for a raw code, `"unknown"` when out of range.
    pub fn code_label(code: u8) -> &'static str {
        Self::from_code(code).map(Self::label).unwrap_or("unknown")
    }

    pub fn severity(self) -> Severity {
        match self {
            ConflictType::ObligationContradiction | ConflictType::RightsContradiction => Severity::Error,
            ConflictType::ObligationOrphaned | ConflictType::RightsNarrowing => Severity::Warning,
            ConflictType::ObligationDuplicate | ConflictType::RightsExpansion => Severity::Info,
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single conflict between an amendment and existing law.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub severity: Severity,
    pub source_amendment: Amendment,
    /// Obligation or right node implicated; empty for expansions.
    pub existing_provision: String,
    pub existing_text: String,
    pub proposed_text: String,
    pub description: String,
}

impl Conflict {
    fn new(conflict_type: ConflictType, entry: &DiffEntry, description: String) -> Self {
        Self {
            conflict_type,
            severity: conflict_type.severity(),
            source_amendment: entry.amendment.clone(),
            existing_provision: String::new(),
            existing_text: String::new(),
            proposed_text: String::new(),
            description,
        }
    }

    fn with_existing(mut self, provision: impl Into<String>, text: impl Into<String>) -> Self {
        self.existing_provision = provision.into();
        self.existing_text = text.into();
        self
    }

    fn with_proposed(mut self, text: impl Into<String>) -> Self {
        self.proposed_text = text.into();
        self
    }
}

/// Conflict counts by severity and type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConflictSummary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub by_type: BTreeMap<ConflictType, usize>,
}

impl ConflictSummary {
    pub fn from_conflicts(conflicts: &[Conflict]) -> Self {
        let mut summary = Self {
            total: conflicts.len(),
            ..Self::default()
        };
        for conflict in conflicts {
            match conflict.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.infos += 1,
            }
            *summary.by_type.entry(conflict.conflict_type).or_default() += 1;
        }
        summary
    }
}

/// All conflicts for one bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConflictReport {
    pub conflicts: Vec<Conflict>,
    pub summary: ConflictSummary,
}

impl ConflictReport {
    pub fn new(mut conflicts: Vec<Conflict>) -> Self {
        sort_conflicts(&mut conflicts);
        let summary = ConflictSummary::from_conflicts(&conflicts);
        Self { conflicts, summary }
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter().filter(move |c| c.severity == severity)
    }
}

/// Sort by severity, then type, then implicated provision.
pub fn sort_conflicts(conflicts: &mut [Conflict]) {
    conflicts.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| a.conflict_type.cmp(&b.conflict_type))
            .then_with(|| a.existing_provision.cmp(&b.existing_provision))
    });
}

/// Detects obligation and rights conflicts for a diff.
#[derive(Debug, Clone, Default)]
pub struct ConflictDetector {
    config: ConflictConfig,
}

impl ConflictDetector {
    /// Create a new conflict detector with the given configuration.
    pub fn new(config: ConflictConfig) -> Self {
        Self { config }
    }

    /// Create a conflict detector with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ConflictConfig::default())
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.conflicts.clone())
    }

    /// Obligation and rights conflicts together, with a summary.
    pub fn detect(&self, diff: &Diff, library: &dyn Library) -> ConflictReport {
        let mut cache = SnapshotCache::new(library);
        let mut conflicts = self.obligation_conflicts(diff, &mut cache);
        conflicts.extend(self.rights_conflicts(diff, &mut cache));

        let report = ConflictReport::new(conflicts);
        tracing::info!(
            total = report.summary.total,
            errors = report.summary.errors,
            warnings = report.summary.warnings,
            "detected conflicts"
        );
        report
    }

    /// Contradicted, orphaned and duplicated obligations, sorted.
    pub fn detect_obligations(&self, diff: &Diff, library: &dyn Library) -> Vec<Conflict> {
        let mut conflicts = self.obligation_conflicts(diff, &mut SnapshotCache::new(library));
        sort_conflicts(&mut conflicts);
        conflicts
    }

    /// Narrowed, repealed, contradicted and expanded rights, sorted.
    pub fn detect_rights(&self, diff: &Diff, library: &dyn Library) -> Vec<Conflict> {
        let mut conflicts = self.rights_conflicts(diff, &mut SnapshotCache::new(library));
        sort_conflicts(&mut conflicts);
        conflicts
    }

    fn obligation_conflicts(&self, diff: &Diff, cache: &mut SnapshotCache<'_>) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        for_each_loaded(&diff.modified, cache, |entry, graph| {
            conflicts.extend(contradicted_obligations(entry, graph));
        });
        for_each_loaded(&diff.removed, cache, |entry, graph| {
            conflicts.extend(orphaned_obligations(entry, graph));
        });
        for_each_loaded(&diff.added, cache, |entry, graph| {
            conflicts.extend(duplicate_obligations(
                entry,
                graph,
                self.config.duplicate_keyword_threshold,
            ));
        });
        conflicts
    }

    fn rights_conflicts(&self, diff: &Diff, cache: &mut SnapshotCache<'_>) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        for_each_loaded(&diff.modified, cache, |entry, graph| {
            conflicts.extend(narrowed_rights(entry, graph));
        });
        for_each_loaded(&diff.removed, cache, |entry, graph| {
            conflicts.extend(repealed_rights(entry, graph));
        });
        for_each_loaded(&diff.added, cache, |entry, graph| {
            conflicts.extend(rights_against_obligations(entry, graph));
            conflicts.extend(expanded_rights(entry, graph));
        });
        conflicts
    }
}

fn for_each_loaded(
    entries: &[DiffEntry],
    cache: &mut SnapshotCache<'_>,
    mut visit: impl FnMut(&DiffEntry, &TripleStore),
) {
    for entry in entries {
        match cache.get(&entry.document_id) {
            Ok(graph) => visit(entry, graph),
            Err(err) => {
                tracing::warn!(uri = %entry.target_uri, reason = %err, "skipping conflict checks");
            }
        }
    }
}

fn text_of(uri: &str, graph: &TripleStore) -> String {
    graph.get_one(uri, vocab::TEXT).unwrap_or_default()
}

fn parent_of(uri: &str, graph: &TripleStore) -> String {
    graph.get_one(uri, vocab::PART_OF).unwrap_or_else(|| uri.to_string())
}

/// Provisions referencing the parent of an obligation or right node.
pub fn dependents_of(uri: &str, graph: &TripleStore) -> Vec<String> {
    let Some(parent) = graph.get_one(uri, vocab::PART_OF) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    graph
        .subjects(vocab::REFERENCES, &parent)
        .into_iter()
        .chain(graph.objects(&parent, vocab::REFERENCED_BY))
        .filter(|dependent| *dependent != parent && seen.insert(dependent.clone()))
        .collect()
}

fn dependent_labels(dependents: &[String]) -> String {
    dependents
        .iter()
        .map(|uri| vocab::uri_label(uri))
        .collect::<Vec<_>>()
        .join(", ")
}

fn contradicted_obligations(entry: &DiffEntry, graph: &TripleStore) -> Vec<Conflict> {
    let proposed = entry.proposed();
    if proposed.is_empty() {
        return Vec::new();
    }

    graph
        .objects(&entry.target_uri, vocab::IMPOSES_OBLIGATION)
        .into_iter()
        .filter_map(|obligation| {
            let existing = text_of(&obligation, graph);
            if existing.is_empty() || !contradicts(proposed, &existing) {
                return None;
            }
            let description = format!(
                "proposed amendment contradicts existing obligation in {}: existing directive conflicts with proposed text",
                vocab::uri_label(&obligation)
            );
            Some(
                Conflict::new(ConflictType::ObligationContradiction, entry, description)
                    .with_existing(obligation, existing)
                    .with_proposed(proposed),
            )
        })
        .collect()
}

fn orphaned_obligations(entry: &DiffEntry, graph: &TripleStore) -> Vec<Conflict> {
    graph
        .objects(&entry.target_uri, vocab::IMPOSES_OBLIGATION)
        .into_iter()
        .filter_map(|obligation| {
            let dependents = dependents_of(&obligation, graph);
            if dependents.is_empty() {
                return None;
            }
            let description = format!(
                "repealing {} orphans obligation {} depended on by: {}",
                entry.target_label(),
                vocab::uri_label(&obligation),
                dependent_labels(&dependents)
            );
            let existing = text_of(&obligation, graph);
            Some(
                Conflict::new(ConflictType::ObligationOrphaned, entry, description)
                    .with_existing(obligation, existing),
            )
        })
        .collect()
}

fn duplicate_obligations(entry: &DiffEntry, graph: &TripleStore, threshold: usize) -> Vec<Conflict> {
    let proposed = entry.proposed();
    let proposed_directives = extract_directives(proposed);
    if proposed_directives.is_empty() {
        return Vec::new();
    }

    graph
        .subjects(vocab::RDF_TYPE, vocab::CLASS_OBLIGATION)
        .into_iter()
        .filter_map(|obligation| {
            let existing = text_of(&obligation, graph);
            if existing.is_empty() {
                return None;
            }
            if !duplicates(&proposed_directives, &extract_directives(&existing), threshold) {
                return None;
            }
            let description = format!(
                "proposed obligation duplicates existing obligation in {}",
                vocab::uri_label(&parent_of(&obligation, graph))
            );
            Some(
                Conflict::new(ConflictType::ObligationDuplicate, entry, description)
                    .with_existing(obligation, existing)
                    .with_proposed(proposed),
            )
        })
        .collect()
}

fn narrowed_rights(entry: &DiffEntry, graph: &TripleStore) -> Vec<Conflict> {
    let proposed = entry.proposed();
    if proposed.is_empty() {
        return Vec::new();
    }

    graph
        .objects(&entry.target_uri, vocab::GRANTS_RIGHT)
        .into_iter()
        .filter_map(|right| {
            let existing = text_of(&right, graph);
            if existing.is_empty() || !narrows_right(&existing, proposed) {
                return None;
            }
            let description = format!(
                "proposed amendment narrows existing right in {}: qualifying or limiting language detected",
                vocab::uri_label(&right)
            );
            Some(
                Conflict::new(ConflictType::RightsNarrowing, entry, description)
                    .with_existing(right, existing)
                    .with_proposed(proposed),
            )
        })
        .collect()
}

fn repealed_rights(entry: &DiffEntry, graph: &TripleStore) -> Vec<Conflict> {
    graph
        .objects(&entry.target_uri, vocab::GRANTS_RIGHT)
        .into_iter()
        .filter_map(|right| {
            let dependents = dependents_of(&right, graph);
            if dependents.is_empty() {
                return None;
            }
            let description = format!(
                "repealing {} removes right {} depended on by: {}",
                entry.target_label(),
                vocab::uri_label(&right),
                dependent_labels(&dependents)
            );
            let existing = text_of(&right, graph);
            Some(
                Conflict::new(ConflictType::RightsNarrowing, entry, description)
                    .with_existing(right, existing),
            )
        })
        .collect()
}

fn rights_against_obligations(entry: &DiffEntry, graph: &TripleStore) -> Vec<Conflict> {
    let proposed = entry.proposed();
    let keywords = right_keywords(proposed);
    if keywords.is_empty() {
        return Vec::new();
    }

    graph
        .subjects(vocab::RDF_TYPE, vocab::CLASS_OBLIGATION)
        .into_iter()
        .filter_map(|obligation| {
            let existing = text_of(&obligation, graph);
            if existing.is_empty() {
                return None;
            }
            let obligation_type = graph
                .get_one(&obligation, vocab::OBLIGATION_TYPE)
                .unwrap_or_default();
            // One finding per obligation
            let keyword = keywords
                .iter()
                .find(|keyword| right_opposes_obligation(keyword, &obligation_type))?;
            let description = format!(
                "proposed right '{}' conflicts with existing obligation in {}",
                keyword,
                vocab::uri_label(&parent_of(&obligation, graph))
            );
            Some(
                Conflict::new(ConflictType::RightsContradiction, entry, description)
                    .with_existing(obligation, existing)
                    .with_proposed(proposed),
            )
        })
        .collect()
}

fn expanded_rights(entry: &DiffEntry, graph: &TripleStore) -> Vec<Conflict> {
    let proposed = entry.proposed();
    let keywords = right_keywords(proposed);
    if keywords.is_empty() {
        return Vec::new();
    }

    let existing_types: Vec<String> = graph
        .subjects(vocab::RDF_TYPE, vocab::CLASS_RIGHT)
        .iter()
        .filter_map(|right| graph.get_one(right, vocab::RIGHT_TYPE))
        .map(|right_type| right_type.to_lowercase())
        .collect();

    keywords
        .into_iter()
        .filter(|keyword| !names_existing_right(keyword, &existing_types))
        .map(|keyword| {
            let description = format!("proposed legislation introduces new right: {keyword}");
            Conflict::new(ConflictType::RightsExpansion, entry, description).with_proposed(proposed)
        })
        .collect()
}

/// `data portability` names `RightToDataPortability`.
fn names_existing_right(keyword: &str, existing_types: &[String]) -> bool {
    let compact: String = keyword.to_lowercase().split_whitespace().collect();
    existing_types
        .iter()
        .any(|right_type| *right_type == compact || right_type.ends_with(&compact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::Amendment;
    use crate::diff::DiffEngine;
    use crate::testing::*;
    use statute_graph::MemoryLibrary;

    fn detect_with(library: &MemoryLibrary, amendments: Vec<Amendment>) -> ConflictReport {
        let diff = DiffEngine::with_defaults().compute(&bill_with(amendments), library);
        ConflictDetector::with_defaults().detect(&diff, library)
    }

    fn detect(amendments: Vec<Amendment>) -> ConflictReport {
        detect_with(&setup_library(), amendments)
    }

    #[test]
    fn test_type_codes_and_severity() {
        for conflict_type in ConflictType::ALL {
            assert_eq!(ConflictType::from_code(conflict_type.code()), Some(conflict_type));
        }
        assert_eq!(ConflictType::code_label(3), "rights_narrowing");
        assert_eq!(ConflictType::code_label(42), "unknown");
        assert_eq!(ConflictType::RightsContradiction.severity(), Severity::Error);
        assert_eq!(ConflictType::ObligationOrphaned.severity(), Severity::Warning);
        assert_eq!(ConflictType::RightsExpansion.severity(), Severity::Info);
    }

    #[test]
    fn test_negating_an_obligation_is_one_error() {
        let report = detect(vec![strike_insert(
            "1",
            "The operator shall provide notice to the consumer.",
            "The operator shall not provide notice to the consumer.",
        )]);

        assert_eq!(report.conflicts.len(), 1);
        let conflict = &report.conflicts[0];
        assert_eq!(conflict.conflict_type, ConflictType::ObligationContradiction);
        assert_eq!(conflict.severity, Severity::Error);
        assert_eq!(
            conflict.existing_provision,
            obligation_uri("1", "InformationProvisionObligation")
        );
        assert_eq!(report.summary.errors, 1);
    }

    #[test]
    fn test_repeal_orphans_referenced_obligation() {
        let report = detect(vec![repeal("1")]);

        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].conflict_type, ConflictType::ObligationOrphaned);
        assert_eq!(
            report.conflicts[0].description,
            "repealing Art1 orphans obligation InformationProvisionObligation depended on by: Art2"
        );
    }

    #[test]
    fn test_repeal_of_unreferenced_right_is_quiet() {
        let report = detect(vec![repeal("4")]);
        assert!(report.is_empty());
    }

    #[test]
    fn test_repeal_of_referenced_right() {
        let mut graph = setup_graph();
        add_reference(&mut graph, "3", "4");
        let report = detect_with(&library_with(graph), vec![repeal("4")]);

        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].conflict_type, ConflictType::RightsNarrowing);
        assert_eq!(
            report.conflicts[0].description,
            "repealing Art4 removes right RightOfAccess depended on by: Art3"
        );
    }

    #[test]
    fn test_exception_narrows_right() {
        let report = detect(vec![strike_insert(
            "4",
            "A consumer has the right to access personal data.",
            "A consumer has the right to access personal data, except when disclosure would harm another.",
        )]);

        let narrowing: Vec<_> = report.by_severity(Severity::Warning).collect();
        assert_eq!(narrowing.len(), 1);
        assert_eq!(narrowing[0].conflict_type, ConflictType::RightsNarrowing);
        assert_eq!(narrowing[0].existing_provision, right_uri("4", "RightOfAccess"));
    }

    #[test]
    fn test_broadened_right_is_not_narrowed() {
        let report = detect(vec![strike_insert(
            "4",
            "A consumer has the right to access personal data.",
            "A consumer has the right to access personal data and inferences.",
        )]);
        assert!(report.is_empty());
    }

    #[test]
    fn test_added_duplicate_obligation() {
        let report = detect(vec![add_at_end(
            "9",
            "The operator shall provide notice to the consumer promptly.",
        )]);

        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].conflict_type, ConflictType::ObligationDuplicate);
        assert_eq!(
            report.conflicts[0].description,
            "proposed obligation duplicates existing obligation in Art1"
        );
    }

    #[test]
    fn test_added_right_against_retention_obligation() {
        let mut graph = setup_graph();
        add_obligation(&mut graph, "3", "RecordKeepingObligation", "shall maintain records");
        let report = detect_with(
            &library_with(graph),
            vec![add_at_end("9", "A consumer has the right to erasure.")],
        );

        assert_eq!(report.summary.total, 2);
        assert_eq!(report.conflicts[0].conflict_type, ConflictType::RightsContradiction);
        assert_eq!(
            report.conflicts[0].description,
            "proposed right 'erasure' conflicts with existing obligation in Art3"
        );
        assert_eq!(report.conflicts[1].conflict_type, ConflictType::RightsExpansion);
        assert_eq!(
            report.conflicts[1].description,
            "proposed legislation introduces new right: erasure"
        );
        assert_eq!(report.summary.by_type[&ConflictType::RightsExpansion], 1);
    }

    #[test]
    fn test_existing_right_is_not_expansion() {
        let mut graph = setup_graph();
        add_right(&mut graph, "3", "RightToErasure", "has the right to erasure");
        let report = detect_with(
            &library_with(graph),
            vec![add_at_end("9", "A consumer has the right to erasure.")],
        );
        assert!(report.is_empty());
    }

    #[test]
    fn test_sorting() {
        let report = detect(vec![
            add_at_end("9", "The operator shall provide notice to the consumer promptly."),
            repeal("1"),
        ]);

        let severities: Vec<_> = report.conflicts.iter().map(|c| c.severity).collect();
        assert_eq!(severities, vec![Severity::Warning, Severity::Info]);
    }
}
