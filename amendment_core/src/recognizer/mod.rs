//! Recognizer - extracts amendment directives from bill section text.
//!
//! Recognition works on two levels:
//! 1. **Anchors**: Find "is amended" markers and standalone "is repealed" text
//! 2. **Target**: Parse the statutory citation from the text before each anchor
//! 3. **Clauses**: Split the anchored block into numbered clauses and lettered
//!    items, narrowing the target at each level
//! 4. **Classify**: Match each clause against the ordered directive patterns
//!
//! Text with no amendment language yields an empty list; recognition never fails.

mod clauses;
mod patterns;

use crate::bill::{Amendment, AmendmentKind, TargetRef};
use crate::config::{AnalysisConfig, RecognizerConfig};

use clauses::{find_preamble_start, split_lettered, split_numbered, Clause};
use patterns::*;

/// Extracts structured amendment directives from raw clause text.
///
/// Pattern tables are compiled once per process, so a recognizer is cheap to
/// create and safe to share between threads.
#[derive(Debug, Clone, Default)]
pub struct Recognizer {
    config: RecognizerConfig,
}

impl Recognizer {
    /// Create a new recognizer with the given configuration.
    pub fn new(config: RecognizerConfig) -> Self {
        Self { config }
    }

    /// Create a recognizer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RecognizerConfig::default())
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.recognizer.clone())
    }

    /// Classify a directive by the first matching pattern in priority order.
    pub fn classify(&self, text: &str) -> Option<AmendmentKind> {
        let normalized = normalize_whitespace(text);
        kind_rules()
            .into_iter()
            .find(|(_, pattern)| pattern.is_match(&normalized))
            .map(|(kind, _)| kind)
    }

    /// Parse the statutory target of a directive.
    ///
    /// Tries a parenthetical U.S.C. citation, then "Section X ... title Y",
    /// then a bare "title Y".
    pub fn parse_target(&self, text: &str) -> Option<TargetRef> {
        let normalized = normalize_whitespace(text);

        if let Some(caps) = USC_CITATION.captures(&normalized) {
            return Some(TargetRef {
                title: caps[1].to_string(),
                section: Some(caps[2].to_string()),
                subsection: caps.get(3).map(|m| m.as_str().to_string()),
            });
        }

        let title = TITLE_OF_USC.captures(&normalized)?[1].to_string();
        match SECTION_OF_TITLE.captures(&normalized) {
            Some(caps) => Some(TargetRef {
                title,
                section: Some(caps[1].to_string()),
                subsection: caps.get(2).map(|m| m.as_str().to_string()),
            }),
            None => Some(TargetRef::title_only(title)),
        }
    }

    /// Extract every amendment directive from a section's raw text.
    ///
    /// The original line structure is kept for clause splitting (indentation
    /// marks clause boundaries); matching happens on normalized text.
    pub fn extract_amendments(&self, text: &str) -> Vec<Amendment> {
        let mut amendments = self.extract_standalone_repeal(text);

        let anchors: Vec<(usize, usize)> = IS_AMENDED
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect();

        let mut previous_target: Option<TargetRef> = None;
        for (idx, &(anchor_start, anchor_end)) in anchors.iter().enumerate() {
            let block_end = anchors
                .get(idx + 1)
                .map(|&(next_start, _)| find_preamble_start(text, next_start).max(anchor_end))
                .unwrap_or(text.len());
            let block = &text[anchor_end..block_end];

            let Some(target) = self.block_target(text, anchor_start, previous_target.as_ref())
            else {
                tracing::debug!(
                    anchor = anchor_start,
                    "skipping amendment block with no recognizable target"
                );
                continue;
            };

            self.extract_block(block, &target, &mut amendments);
            previous_target = Some(target);
        }

        amendments
    }

    /// Resolve the target of the block anchored at `anchor_start`.
    ///
    /// The block's own preamble wins. A preamble that names only a section
    /// ("Section 1306 of such title") inherits the title of the previous
    /// block. Otherwise all preceding text is searched.
    fn block_target(
        &self,
        text: &str,
        anchor_start: usize,
        previous: Option<&TargetRef>,
    ) -> Option<TargetRef> {
        let local_start = find_preamble_start(text, anchor_start);
        let local = &text[local_start..anchor_start];

        if let Some(target) = self.parse_target(local) {
            return Some(target);
        }

        if let (Some(previous), Some(caps)) = (previous, SECTION_OF_TITLE.captures(local)) {
            return Some(TargetRef {
                title: previous.title.clone(),
                section: Some(caps[1].to_string()),
                subsection: caps.get(2).map(|m| m.as_str().to_string()),
            });
        }

        self.parse_target(&text[..anchor_start])
    }

    /// Repeals phrased without an "is amended" anchor.
    fn extract_standalone_repeal(&self, text: &str) -> Vec<Amendment> {
        let normalized = normalize_whitespace(text);
        if !REPEAL.is_match(&normalized) || IS_AMENDED.is_match(text) {
            return Vec::new();
        }

        match self.parse_target(&normalized) {
            Some(target) => vec![Amendment::new(AmendmentKind::Repeal, target)
                .with_description(self.describe(&normalized))],
            None => {
                tracing::debug!("repeal language without a recognizable target");
                Vec::new()
            }
        }
    }

    fn extract_block(&self, block: &str, target: &TargetRef, out: &mut Vec<Amendment>) {
        let clauses = split_numbered(block);
        let Some(first) = clauses.first() else {
            out.extend(self.build(block, target.clone()));
            return;
        };

        // An inline directive ahead of the first numbered clause is complete on
        // its own; the numbered content that follows belongs to the inserted text.
        let lead = &block[..first.start];
        if !lead.trim().is_empty() && self.classify(lead).is_some() {
            out.extend(self.build(lead, target.clone()));
            return;
        }

        for clause in &clauses {
            self.extract_clause(clause, target, out);
        }
    }

    fn extract_clause(&self, clause: &Clause<'_>, target: &TargetRef, out: &mut Vec<Amendment>) {
        let Some(scope) = IN_SUBSECTION.captures(clause.text) else {
            out.extend(self.build(clause.text, target.clone()));
            return;
        };
        let scoped = format!("({})", &scope[1]);

        let items = split_lettered(clause.text);
        if items.is_empty() {
            out.extend(self.build(clause.text, target.scoped(Some(scoped))));
            return;
        }

        for item in &items {
            let subsection = match PARAGRAPH_REF.captures(item.text) {
                Some(paragraph) => format!("{scoped}({})", &paragraph[1]),
                None => scoped.clone(),
            };
            out.extend(self.build(item.text, target.scoped(Some(subsection))));
        }
    }

    /// Build an amendment from clause text, or `None` if it has no directive.
    fn build(&self, clause_text: &str, target: TargetRef) -> Option<Amendment> {
        let kind = self.classify(clause_text)?;
        let normalized = normalize_whitespace(clause_text);
        let mut amendment = Amendment::new(kind, target).with_description(self.describe(&normalized));

        match kind {
            AmendmentKind::StrikeInsert => {
                if let Some(caps) = STRIKE_INSERT.captures(&normalized) {
                    amendment.strike_text = Some(caps[1].to_string());
                    amendment.insert_text = Some(caps[2].to_string());
                }
            }
            AmendmentKind::AddAtEnd | AmendmentKind::AddNewSection => {
                amendment.insert_text = extract_quoted_insert_text(clause_text);
            }
            AmendmentKind::Redesignate => {
                if let Some(caps) = REDESIGNATE.captures(&normalized) {
                    amendment.strike_text = Some(format!("({})", &caps[1]));
                    amendment.insert_text = Some(format!("({})", &caps[2]));
                }
            }
            _ => {}
        }

        Some(amendment)
    }

    fn describe(&self, normalized: &str) -> String {
        truncate_chars(normalized, self.config.description_limit)
    }
}

/// Collapse all whitespace runs (including newlines) into single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Quoted text following the last colon, e.g. the body of "the following:".
fn extract_quoted_insert_text(text: &str) -> Option<String> {
    let after_colon = text.rfind(':').map(|idx| &text[idx..]).unwrap_or(text);
    let normalized = normalize_whitespace(after_colon);
    QUOTED_BLOCK
        .captures(&normalized)
        .map(|caps| caps[1].to_string())
}

/// Keep at most `limit` characters, marking the cut with `...`.
pub(crate) fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
