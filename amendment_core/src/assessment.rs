//! Assessment - the whole pipeline for one bill, with an overall risk level.
//!
//! Runs in a fixed order:
//! 1. **Diff**: resolve every amendment against the library
//! 2. **Impact**: traverse from each changed provision
//! 3. **Conflicts**: obligation and rights clashes
//! 4. **Temporal**: effective dates, gaps, retroactivity, sunsets
//! 5. **Overlay**: apply the diff to cloned snapshots
//! 6. **Risk**: classify from the aggregated counts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use statute_graph::{DirectoryLibrary, Library};

use crate::bill::Bill;
use crate::config::AnalysisConfig;
use crate::conflicts::{ConflictDetector, ConflictReport};
use crate::diff::{Diff, DiffEngine};
use crate::error::Result;
use crate::finding::Severity;
use crate::impact::{BillImpact, ImpactAnalyzer};
use crate::overlay::{OverlayEngine, OverlayStats, SkippedAmendment};
use crate::temporal::{TemporalAnalyzer, TemporalReport};

/// Broken references above this count make a bill high risk.
const HIGH_RISK_BROKEN_REFERENCES: usize = 5;
/// Affected provisions above this count make a bill high risk.
const HIGH_RISK_AFFECTED: usize = 50;

/// Overall risk of enacting a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Classify a set of results, returning the level and its justification.
    ///
    /// The first high-risk trigger wins on its own. Otherwise every medium
    /// trigger is listed.
    pub fn assess(conflicts: &ConflictReport, impact: &BillImpact, temporal: &TemporalReport) -> (Self, String) {
        let errors = conflicts.summary.errors;
        if errors > 0 {
            return (RiskLevel::High, format!("{errors} conflict error(s) detected"));
        }

        let broken = impact.broken_references.len();
        if broken > HIGH_RISK_BROKEN_REFERENCES {
            return (
                RiskLevel::High,
                format!("{broken} broken cross-references (>{HIGH_RISK_BROKEN_REFERENCES})"),
            );
        }

        let affected = impact.total_affected;
        if affected > HIGH_RISK_AFFECTED {
            return (
                RiskLevel::High,
                format!("{affected} provisions affected (>{HIGH_RISK_AFFECTED})"),
            );
        }

        let mut reasons = Vec::new();
        let warnings = conflicts.summary.warnings;
        if warnings > 0 {
            reasons.push(format!("{warnings} conflict warning(s)"));
        }
        if broken > 0 {
            reasons.push(format!("{broken} broken cross-reference(s)"));
        }
        let temporal_issues = temporal
            .findings
            .iter()
            .filter(|finding| finding.severity != Severity::Info)
            .count();
        if temporal_issues > 0 {
            reasons.push(format!("{temporal_issues} temporal issue(s)"));
        }

        if reasons.is_empty() {
            (RiskLevel::Low, "no significant issues detected".to_string())
        } else {
            (RiskLevel::Medium, reasons.join("; "))
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Headline counts for a reporting layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExecutiveSummary {
    pub bill_title: String,
    pub bill_number: String,
    pub amendment_count: usize,
    pub titles_affected: Vec<u32>,
    pub provisions_modified: usize,
    pub provisions_repealed: usize,
    pub provisions_added: usize,
    pub provisions_redesignated: usize,
    pub unresolved_amendments: usize,
    pub total_provisions_affected: usize,
    pub broken_cross_refs: usize,
    pub conflict_errors: usize,
    pub conflict_warnings: usize,
    pub obligations_added: usize,
    pub obligations_removed: usize,
    pub rights_added: usize,
    pub rights_removed: usize,
    pub temporal_findings: usize,
    pub risk_level: RiskLevel,
    pub risk_justification: String,
}

impl ExecutiveSummary {
    fn new(diff: &Diff, impact: &BillImpact, conflicts: &ConflictReport, temporal: &TemporalReport) -> Self {
        let bill = &diff.bill;
        let (risk_level, risk_justification) = RiskLevel::assess(conflicts, impact, temporal);

        Self {
            bill_title: bill.short_title.clone().unwrap_or_else(|| bill.title.clone()),
            bill_number: bill.bill_number.clone(),
            amendment_count: bill.amendments().count(),
            titles_affected: titles_affected(diff),
            provisions_modified: diff.modified.len(),
            provisions_repealed: diff.removed.len(),
            provisions_added: diff.added.len(),
            provisions_redesignated: diff.redesignated.len(),
            unresolved_amendments: diff.unresolved.len(),
            total_provisions_affected: impact.total_affected,
            broken_cross_refs: impact.broken_references.len(),
            conflict_errors: conflicts.summary.errors,
            conflict_warnings: conflicts.summary.warnings,
            obligations_added: impact.obligation_changes.added.len(),
            obligations_removed: impact.obligation_changes.removed.len(),
            rights_added: impact.rights_changes.added.len(),
            rights_removed: impact.rights_changes.removed.len(),
            temporal_findings: temporal.findings.len(),
            risk_level,
            risk_justification,
        }
    }
}

/// Numeric titles touched by resolved amendments, ascending.
fn titles_affected(diff: &Diff) -> Vec<u32> {
    diff.all_entries()
        .filter_map(|entry| entry.amendment.target.title.trim().parse().ok())
        .collect::<BTreeSet<u32>>()
        .into_iter()
        .collect()
}

/// Overlay outcome without the proposed graph itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OverlaySummary {
    pub stats: OverlayStats,
    pub applied: usize,
    pub skipped: Vec<SkippedAmendment>,
}

/// Every analysis of one bill against one library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub generated_at: DateTime<Utc>,
    pub risk_level: RiskLevel,
    pub summary: ExecutiveSummary,
    pub diff: Diff,
    pub impact: BillImpact,
    pub conflicts: ConflictReport,
    pub temporal: TemporalReport,
    pub overlay: OverlaySummary,
}

impl Assessment {
    /// Run the full pipeline. Per-amendment failures are recorded, never
    /// raised.
    pub fn run(bill: &Bill, library: &dyn Library, config: &AnalysisConfig) -> Self {
        let diff = DiffEngine::from_config(config).compute(bill, library);
        let impact = ImpactAnalyzer::from_config(config).analyze_default(&diff, library);
        let conflicts = ConflictDetector::from_config(config).detect(&diff, library);
        let temporal = TemporalAnalyzer::from_config(config).analyze(&diff, Some(library));

        let scenario = OverlayEngine::from_config(config).apply(&diff, library);
        let overlay = OverlaySummary {
            stats: scenario.stats,
            applied: scenario.applied.len(),
            skipped: scenario.skipped,
        };

        let summary = ExecutiveSummary::new(&diff, &impact, &conflicts, &temporal);
        tracing::info!(
            bill = %bill.bill_number,
            risk = %summary.risk_level,
            justification = %summary.risk_justification,
            "assessed bill"
        );

        Self {
            generated_at: Utc::now(),
            risk_level: summary.risk_level,
            summary,
            diff,
            impact,
            conflicts,
            temporal,
            overlay,
        }
    }

    /// Open a directory library and run the pipeline against it.
    ///
    /// An unopenable library is the only failure.
    pub fn run_from_path(bill: &Bill, library_path: impl AsRef<Path>, config: &AnalysisConfig) -> Result<Self> {
        let library = DirectoryLibrary::open(library_path)?;
        Ok(Self::run(bill, &library, config))
    }
}
