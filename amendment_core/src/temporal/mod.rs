//! Temporal Analyzer - effective dates, gaps, retroactivity and sunsets.
//!
//! Four independent scans over a diff and its bill text:
//! 1. **Gaps**: each repealed section is matched against added sections; a
//!    repeal with no related addition, or with one but no effective date,
//!    leaves a window where no rule applies
//! 2. **Contradictions**: modified provisions that are in force while
//!    provisions referencing them are also current (needs a library)
//! 3. **Retroactivity**: phrasing that reaches back before enactment
//! 4. **Sunsets**: expiration and termination phrasing

mod effective_date;

pub use effective_date::*;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use statute_graph::{vocab, Library, TripleStore};

use crate::config::{AnalysisConfig, RelatedSectionConfig, TemporalConfig};
use crate::diff::{Diff, DiffEntry, SnapshotCache};
use crate::finding::Severity;
use crate::recognizer::{normalize_whitespace, truncate_chars};

static SECTION_IN_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":Art(\d+[A-Za-z]*)").expect("Invalid section URI regex"));

static RETROACTIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)shall\s+apply\s+to\s+(?:any\s+)?(?:action|conduct|violation|proceeding)s?\s+(?:taken|occurring|commenced)\s+(?:before|prior\s+to)\s+(?:the\s+)?date\s+of\s+(?:the\s+)?enactment",
        r"(?i)retroactive(?:ly)?\s+(?:to|effective)",
        r"(?i)applies?\s+(?:retroactively|to\s+past\s+(?:conduct|actions|events))",
        r"(?i)(?:effective|apply)\s+(?:as\s+of|beginning)\s+(?:a\s+date\s+)?(?:before|prior\s+to)\s+(?:the\s+)?(?:date\s+of\s+)?enactment",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid retroactivity regex"))
    .collect()
});

static SUNSET_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(?:this\s+)?(?:section|act|provision)\s+(?:shall\s+)?(?:expire|terminate)",
        r"(?i)cease\s+to\s+(?:be\s+)?(?:effective|in\s+effect)",
        r"(?i)sunset\s+(?:date|provision|clause)",
        r"(?i)shall\s+(?:not\s+)?(?:remain\s+)?in\s+effect\s+(?:only\s+)?(?:until|through|for\s+a\s+period\s+of)",
        r"(?i)(?:is\s+)?repealed\s+(?:effective|on)\s+(?:january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{1,2},?\s+\d{4}",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid sunset regex"))
    .collect()
});

/// Closed set of temporal issue kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalIssueType {
    Gap,
    Contradiction,
    Retroactive,
    Sunset,
}

impl TemporalIssueType {
    pub const ALL: [TemporalIssueType; 4] = [
        TemporalIssueType::Gap,
        TemporalIssueType::Contradiction,
        TemporalIssueType::Retroactive,
        TemporalIssueType::Sunset,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            TemporalIssueType::Gap => "temporal_gap",
            TemporalIssueType::Contradiction => "temporal_contradiction",
            TemporalIssueType::Retroactive => "temporal_retroactive",
            TemporalIssueType::Sunset => "temporal_sunset",
        }
    }

    /// Label for a raw code, `"unknown"` when out of range.
    pub fn code_label(code: u8) -> &'static str {
        Self::from_code(code).map(Self::label).unwrap_or("unknown")
    }

    pub fn severity(self) -> Severity {
        match self {
            TemporalIssueType::Contradiction => Severity::Error,
            TemporalIssueType::Gap | TemporalIssueType::Retroactive => Severity::Warning,
            TemporalIssueType::Sunset => Severity::Info,
        }
    }
}

impl fmt::Display for TemporalIssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A temporal-consistency issue or informational note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalFinding {
    #[serde(rename = "type")]
    pub issue_type: TemporalIssueType,
    pub severity: Severity,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provisions: Vec<String>,
}

impl TemporalFinding {
    pub fn new(issue_type: TemporalIssueType, description: impl Into<String>) -> Self {
        Self {
            issue_type,
            severity: issue_type.severity(),
            description: description.into(),
            effective_date: None,
            provisions: Vec::new(),
        }
    }

    pub fn with_provisions(mut self, provisions: Vec<String>) -> Self {
        self.provisions = provisions;
        self
    }

    pub fn with_effective_date(mut self, date: Option<NaiveDate>) -> Self {
        self.effective_date = date;
        self
    }
}

/// Sort by severity, then type, then first implicated provision.
pub fn sort_findings(findings: &mut [TemporalFinding]) {
    fn first(finding: &TemporalFinding) -> &str {
        finding.provisions.first().map(String::as_str).unwrap_or_default()
    }
    findings.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| a.issue_type.cmp(&b.issue_type))
            .then_with(|| first(a).cmp(first(b)))
    });
}

/// Temporal findings for one bill, plus the effective date they assumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TemporalReport {
    pub effective_date: Option<EffectiveDate>,
    pub findings: Vec<TemporalFinding>,
}

impl TemporalReport {
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }
}

/// Section designator of a provision URI, e.g. `6502A` from `...:Art6502A`.
pub fn section_of(uri: &str) -> Option<&str> {
    SECTION_IN_URI
        .captures(uri)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Whether `candidate` plausibly replaces `original`.
///
/// Identical sections always match. `6502A` extends `6502` when suffix
/// extension is on, and `6502`/`6503` share a block when both are at least
/// `block_min_len` characters long.
pub fn is_related_section(original: &str, candidate: &str, config: &RelatedSectionConfig) -> bool {
    if original.is_empty() || candidate.is_empty() {
        return false;
    }
    if original == candidate {
        return true;
    }
    if config.match_suffix_extension && candidate.starts_with(original) {
        return true;
    }

    let min_len = config.block_min_len;
    if min_len == 0 || original.chars().count() < min_len || candidate.chars().count() < min_len {
        return false;
    }
    without_last_char(original) == without_last_char(candidate)
}

fn without_last_char(text: &str) -> &str {
    text.char_indices().last().map_or(text, |(i, _)| &text[..i])
}

/// Runs the temporal scans over a diff.
#[derive(Debug, Clone, Default)]
pub struct TemporalAnalyzer {
    config: TemporalConfig,
}

impl TemporalAnalyzer {
    /// Create a new temporal analyzer with the given configuration.
    pub fn new(config: TemporalConfig) -> Self {
        Self { config }
    }

    /// Create a temporal analyzer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TemporalConfig::default())
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.temporal.clone())
    }

    /// Run every scan. Contradictions are only checked with a library.
    pub fn analyze(&self, diff: &Diff, library: Option<&dyn Library>) -> TemporalReport {
        let raw_text = &diff.bill.raw_text;
        let effective_date = EffectiveDate::parse(raw_text);

        let mut findings = self.detect_gaps(&diff.removed, &diff.added, effective_date.as_ref());
        findings.extend(self.detect_retroactivity(raw_text));
        if let Some(library) = library {
            findings.extend(self.detect_contradictions(&diff.modified, library));
        }
        findings.extend(self.detect_sunsets(raw_text));
        sort_findings(&mut findings);

        tracing::info!(
            findings = findings.len(),
            effective = effective_date.is_some(),
            "analyzed temporal consistency"
        );
        TemporalReport {
            effective_date,
            findings,
        }
    }

    /// Repeals without a related addition, or with one but no known date.
    pub fn detect_gaps(
        &self,
        removed: &[DiffEntry],
        added: &[DiffEntry],
        effective_date: Option<&EffectiveDate>,
    ) -> Vec<TemporalFinding> {
        let additions: Vec<(&str, &DiffEntry)> = added
            .iter()
            .filter_map(|entry| section_of(&entry.target_uri).map(|section| (section, entry)))
            .collect();

        let mut findings = Vec::new();
        for repeal in removed {
            let Some(repealed) = section_of(&repeal.target_uri) else {
                continue;
            };

            let replacement = additions
                .iter()
                .find(|(section, _)| is_related_section(repealed, section, &self.config.related));

            match replacement {
                Some((section, addition)) if effective_date.is_none() => {
                    findings.push(
                        TemporalFinding::new(
                            TemporalIssueType::Gap,
                            format!(
                                "potential temporal gap: section {repealed} is repealed and section {section} is added, but effective dates could not be determined"
                            ),
                        )
                        .with_provisions(vec![repeal.target_uri.clone(), addition.target_uri.clone()]),
                    );
                }
                Some(_) => {}
                None => {
                    findings.push(
                        TemporalFinding::new(
                            TemporalIssueType::Gap,
                            format!("section {repealed} is repealed with no apparent replacement in this bill"),
                        )
                        .with_provisions(vec![repeal.target_uri.clone()])
                        .with_effective_date(effective_date.and_then(EffectiveDate::date)),
                    );
                }
            }
        }
        findings
    }

    /// Modified in-force provisions referenced by provisions that are current.
    pub fn detect_contradictions(&self, modified: &[DiffEntry], library: &dyn Library) -> Vec<TemporalFinding> {
        let mut cache = SnapshotCache::new(library);
        let mut findings = Vec::new();

        for entry in modified {
            let graph = match cache.get(&entry.document_id) {
                Ok(graph) => &*graph,
                Err(err) => {
                    tracing::warn!(uri = %entry.target_uri, reason = %err, "skipping temporal contradiction check");
                    continue;
                }
            };

            for status in graph.objects(&entry.target_uri, vocab::TEMPORAL_KIND) {
                let lowered = status.to_lowercase();
                if !lowered.contains("in_force") && !lowered.contains("as_amended") {
                    continue;
                }

                let related = current_referrers(&entry.target_uri, graph);
                if related.is_empty() {
                    continue;
                }

                let description = format!(
                    "potential temporal contradiction: modifying {} which has temporal status '{}' while related provisions may be in conflicting temporal states",
                    entry.target_label(),
                    status
                );
                let provisions = std::iter::once(entry.target_uri.clone()).chain(related).collect();
                findings.push(
                    TemporalFinding::new(TemporalIssueType::Contradiction, description).with_provisions(provisions),
                );
            }
        }
        findings
    }

    /// One warning per retroactivity phrasing found.
    pub fn detect_retroactivity(&self, text: &str) -> Vec<TemporalFinding> {
        self.scan(text, &RETROACTIVE_PATTERNS, TemporalIssueType::Retroactive, "retroactive application detected")
    }

    /// One informational note per sunset phrasing found.
    pub fn detect_sunsets(&self, text: &str) -> Vec<TemporalFinding> {
        self.scan(text, &SUNSET_PATTERNS, TemporalIssueType::Sunset, "sunset clause detected")
    }

    fn scan(&self, text: &str, patterns: &[Regex], issue_type: TemporalIssueType, lead: &str) -> Vec<TemporalFinding> {
        let text = normalize_whitespace(text).to_lowercase();
        patterns
            .iter()
            .filter_map(|pattern| pattern.find(&text))
            .map(|m| {
                let quoted = excerpt(m.as_str(), self.config.excerpt_limit);
                TemporalFinding::new(issue_type, format!("{lead}: '{quoted}'"))
            })
            .collect()
    }
}

/// Provisions referencing `uri` whose own status is current or in force.
fn current_referrers(uri: &str, graph: &TripleStore) -> Vec<String> {
    graph
        .subjects(vocab::REFERENCES, uri)
        .into_iter()
        .filter(|referrer| {
            graph.objects(referrer, vocab::TEMPORAL_KIND).iter().any(|status| {
                let status = status.to_lowercase();
                status.contains("in_force") || status.contains("current")
            })
        })
        .collect()
}

/// At most `limit` characters, the last three being "..." when cut.
fn excerpt(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        truncate_chars(text, limit.saturating_sub(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::{Amendment, Bill, BillSection};
    use crate::diff::DiffEngine;
    use crate::testing::*;
    use statute_graph::MemoryLibrary;

    fn diff_for(library: &MemoryLibrary, amendments: Vec<Amendment>, text: &str) -> Diff {
        let bill: Bill = bill_with(amendments).with_section(BillSection::new("3", "Effective Date", text));
        DiffEngine::with_defaults().compute(&bill, library)
    }

    fn analyze(amendments: Vec<Amendment>, text: &str) -> TemporalReport {
        let library = setup_library();
        let diff = diff_for(&library, amendments, text);
        TemporalAnalyzer::with_defaults().analyze(&diff, Some(&library))
    }

    #[test]
    fn test_issue_type_codes() {
        for issue_type in TemporalIssueType::ALL {
            assert_eq!(TemporalIssueType::from_code(issue_type.code()), Some(issue_type));
        }
        assert_eq!(TemporalIssueType::code_label(0), "temporal_gap");
        assert_eq!(TemporalIssueType::code_label(7), "unknown");
        assert_eq!(TemporalIssueType::Sunset.severity(), Severity::Info);
    }

    #[test]
    fn test_section_of() {
        assert_eq!(section_of(&art_uri("6502")), Some("6502"));
        assert_eq!(section_of("https://x/US-USC-TITLE-15:Art6502A(b)"), Some("6502A"));
        assert_eq!(section_of("https://x/US-USC-TITLE-15"), None);
    }

    #[test]
    fn test_related_sections() {
        let config = RelatedSectionConfig::default();
        assert!(is_related_section("6502", "6502", &config));
        assert!(is_related_section("6502", "6502A", &config));
        assert!(is_related_section("6502", "6503", &config));
        assert!(!is_related_section("6502", "6512", &config));
        assert!(!is_related_section("12", "13", &config));
        assert!(!is_related_section("", "", &config));

        let strict = RelatedSectionConfig {
            match_suffix_extension: false,
            block_min_len: 0,
        };
        assert!(!is_related_section("6502", "6502A", &strict));
        assert!(!is_related_section("6502", "6503", &strict));
    }

    #[test]
    fn test_repeal_without_replacement() {
        let report = analyze(vec![repeal("1")], "");

        assert_eq!(report.findings.len(), 1);
        let finding = &report.findings[0];
        assert_eq!(finding.issue_type, TemporalIssueType::Gap);
        assert_eq!(finding.severity, Severity::Warning);
        assert_eq!(
            finding.description,
            "section 1 is repealed with no apparent replacement in this bill"
        );
        assert_eq!(finding.provisions, vec![art_uri("1")]);
    }

    #[test]
    fn test_replacement_without_date_is_potential_gap() {
        let report = analyze(vec![repeal("1"), add_at_end("1A", "New text.")], "");

        assert_eq!(report.findings.len(), 1);
        assert!(report.findings[0]
            .description
            .starts_with("potential temporal gap: section 1 is repealed and section 1A is added"));
        assert_eq!(report.findings[0].provisions, vec![art_uri("1"), art_uri("1A")]);
    }

    #[test]
    fn test_replacement_with_date_is_quiet() {
        let report = analyze(
            vec![repeal("1"), add_at_end("1A", "New text.")],
            "This Act shall take effect on January 1, 2026.",
        );

        assert!(report.is_empty());
        assert_eq!(
            report.effective_date.and_then(|date| date.date()),
            NaiveDate::from_ymd_opt(2026, 1, 1)
        );
    }

    #[test]
    fn test_retroactivity_and_sunset() {
        let report = analyze(
            vec![],
            "This section shall apply to conduct occurring before the date of enactment. \
             This section shall expire on December 31, 2030.",
        );

        assert_eq!(report.findings.len(), 2);
        assert_eq!(report.findings[0].issue_type, TemporalIssueType::Retroactive);
        assert_eq!(
            report.findings[0].description,
            "retroactive application detected: 'shall apply to conduct occurring before the date of enactment'"
        );
        assert_eq!(report.findings[1].issue_type, TemporalIssueType::Sunset);
        assert_eq!(report.findings[1].description, "sunset clause detected: 'this section shall expire'");
        assert_eq!(report.count(Severity::Info), 1);
    }

    #[test]
    fn test_contradiction_needs_current_referrer() {
        let mut graph = setup_graph();
        graph.add(art_uri("2"), vocab::TEMPORAL_KIND, "in_force_on").unwrap();
        graph.add(art_uri("3"), vocab::TEMPORAL_KIND, "current").unwrap();
        let library = library_with(graph);
        let diff = diff_for(&library, vec![strike_insert("2", "records", "files")], "");

        let analyzer = TemporalAnalyzer::with_defaults();
        let report = analyzer.analyze(&diff, Some(&library));
        assert_eq!(report.findings.len(), 1);
        let finding = &report.findings[0];
        assert_eq!(finding.issue_type, TemporalIssueType::Contradiction);
        assert_eq!(finding.severity, Severity::Error);
        assert_eq!(finding.provisions, vec![art_uri("2"), art_uri("3")]);

        assert!(analyzer.analyze(&diff, None).is_empty());
    }

    #[test]
    fn test_findings_sorted_by_severity() {
        let mut graph = setup_graph();
        graph.add(art_uri("2"), vocab::TEMPORAL_KIND, "as_amended").unwrap();
        graph.add(art_uri("3"), vocab::TEMPORAL_KIND, "in_force").unwrap();
        let library = library_with(graph);
        let diff = diff_for(
            &library,
            vec![repeal("4"), strike_insert("2", "records", "files")],
            "The sunset date is 2030. Penalties apply retroactively.",
        );

        let report = TemporalAnalyzer::with_defaults().analyze(&diff, Some(&library));
        let types: Vec<_> = report.findings.iter().map(|f| f.issue_type).collect();
        assert_eq!(
            types,
            vec![
                TemporalIssueType::Contradiction,
                TemporalIssueType::Gap,
                TemporalIssueType::Retroactive,
                TemporalIssueType::Sunset,
            ]
        );
    }

    #[test]
    fn test_excerpt_limit() {
        let long = "a".repeat(150);
        let quoted = excerpt(&long, 100);
        assert_eq!(quoted.chars().count(), 100);
        assert!(quoted.ends_with("..."));
        assert_eq!(excerpt("short", 100), "short");
    }
}
