//! Rights heuristics - narrowing, right keywords, and right/obligation tension.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::recognizer::normalize_whitespace;

/// Phrases that restrict a right when newly introduced.
const NARROWING_QUALIFIERS: &[&str] = &[
    "except when",
    "except where",
    "except in cases",
    "unless",
    "provided that",
    "subject to",
    "limited to",
    "only if",
    "only when",
    "only where",
    "shall not apply",
    "does not apply",
    "notwithstanding",
    "restricted to",
    "may not exercise",
];

/// Phrases that grant a right; dropping one narrows it.
const RIGHT_GRANTING_PHRASES: &[&str] = &[
    "has the right",
    "shall have the right",
    "is entitled to",
    "shall be entitled",
    "may request",
    "may obtain",
    "right to access",
    "right to erasure",
    "right to rectification",
    "right to object",
    "right to data portability",
];

/// Right terms that pull against obligation terms in the same row.
const RIGHTS_OBLIGATION_TENSIONS: &[(&[&str], &[&str])] = &[
    (
        &["access", "information", "disclosure"],
        &["minimization", "restrict", "confidential", "nondisclosure"],
    ),
    (
        &["erasure", "deletion", "forget"],
        &["retention", "preserve", "record", "maintain"],
    ),
    (
        &["portability", "transfer", "export"],
        &["localization", "restrict transfer", "restrict export"],
    ),
    (
        &["object", "refuse", "opt out"],
        &["mandatory", "compulsory", "required participation"],
    ),
];

static RIGHT_KEYWORD_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)right\s+to\s+(\w+(?:\s+\w+)?)",
        r"(?i)right\s+of\s+(\w+(?:\s+\w+)?)",
        r"(?i)entitled\s+to\s+(\w+(?:\s+\w+)?)",
        r"(?i)may\s+(access|request|obtain|transfer|object|refuse|erasure|rectif\w+|portability)",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid right keyword regex"))
    .collect()
});

/// True when `proposed` adds a qualifier absent from `existing`, or drops a
/// right-granting phrase `existing` contains.
pub fn narrows_right(existing: &str, proposed: &str) -> bool {
    let existing = normalize_whitespace(existing).to_lowercase();
    let proposed = normalize_whitespace(proposed).to_lowercase();

    let adds_qualifier = NARROWING_QUALIFIERS
        .iter()
        .any(|q| proposed.contains(q) && !existing.contains(q));
    let drops_grant = RIGHT_GRANTING_PHRASES
        .iter()
        .any(|p| existing.contains(p) && !proposed.contains(p));

    adds_qualifier || drops_grant
}

/// Keywords naming the rights a text grants, deduplicated in match order.
pub fn right_keywords(text: &str) -> Vec<String> {
    let text = normalize_whitespace(text).to_lowercase();
    let mut keywords: Vec<String> = Vec::new();

    for pattern in RIGHT_KEYWORD_PATTERNS.iter() {
        for caps in pattern.captures_iter(&text) {
            let keyword = caps[1].trim().to_string();
            if !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }
    }

    keywords
}

/// True when a right keyword and an obligation type fall in the same row of
/// the tension table.
pub fn right_opposes_obligation(right_keyword: &str, obligation_type: &str) -> bool {
    let right = right_keyword.to_lowercase();
    let obligation = obligation_type.to_lowercase();

    RIGHTS_OBLIGATION_TENSIONS.iter().any(|(right_terms, obligation_terms)| {
        right_terms.iter().any(|term| right.contains(term))
            && obligation_terms.iter().any(|term| obligation.contains(term))
    })
}
