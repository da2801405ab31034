//! Directive extraction - "shall", "must not" and friends.
//!
//! A directive is a (verb, polarity, subject keywords) triple read from one
//! sentence. Two directives contradict when their polarity differs and their
//! subjects overlap; they duplicate when polarity matches and enough subject
//! keywords are shared.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::recognizer::normalize_whitespace;

/// Ordered so that negated forms are tried before their positive prefixes.
static DIRECTIVE_PATTERNS: Lazy<Vec<(Regex, bool)>> = Lazy::new(|| {
    [
        (r"(?i)\b(shall\s+not)\b\s+(.+?)(?:[.;]|$)", true),
        (r"(?i)\b(must\s+not)\b\s+(.+?)(?:[.;]|$)", true),
        (r"(?i)\b(may\s+not)\b\s+(.+?)(?:[.;]|$)", true),
        (r"(?i)\b(is\s+prohibited\s+from)\b\s+(.+?)(?:[.;]|$)", true),
        (r"(?i)\b(shall)\b\s+(.+?)(?:[.;]|$)", false),
        (r"(?i)\b(must)\b\s+(.+?)(?:[.;]|$)", false),
        (r"(?i)\b(is\s+required\s+to)\b\s+(.+?)(?:[.;]|$)", false),
    ]
    .into_iter()
    .map(|(pattern, negated)| (Regex::new(pattern).expect("Invalid directive regex"), negated))
    .collect()
});

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "of", "to", "in", "for", "and", "or", "with", "be", "by", "on", "at", "from",
    "as", "is", "it", "that", "this", "any", "all", "each", "such",
];

/// One directive phrase read from legal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub verb: String,
    pub negated: bool,
    pub keywords: HashSet<String>,
}

impl Directive {
    /// Opposite polarity over at least one shared subject keyword.
    pub fn contradicts(&self, other: &Directive) -> bool {
        self.negated != other.negated && !self.keywords.is_disjoint(&other.keywords)
    }

    /// Same polarity with at least `threshold` shared subject keywords.
    pub fn duplicates(&self, other: &Directive, threshold: usize) -> bool {
        self.negated == other.negated
            && !self.keywords.is_empty()
            && self.keywords.intersection(&other.keywords).count() >= threshold
    }
}

/// Extract every directive from `text`, in pattern order.
///
/// A positive match whose subject begins with "not" is the positive prefix of
/// a negated directive already captured, and is skipped.
pub fn extract_directives(text: &str) -> Vec<Directive> {
    let text = normalize_whitespace(text);
    let mut directives = Vec::new();

    for (pattern, negated) in DIRECTIVE_PATTERNS.iter() {
        for caps in pattern.captures_iter(&text) {
            let verb = caps[1].to_lowercase();
            let subject = caps[2].trim().to_lowercase();
            if !negated && (subject == "not" || subject.starts_with("not ")) {
                continue;
            }

            directives.push(Directive {
                verb: normalize_whitespace(&verb),
                negated: *negated,
                keywords: subject_keywords(&subject),
            });
        }
    }

    directives
}

/// Meaningful words of a directive's subject: longer than two characters and
/// not a stop word.
pub fn subject_keywords(subject: &str) -> HashSet<String> {
    subject
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| ".,;:()\"'".contains(c)))
        .filter(|word| word.chars().count() > 2 && !STOP_WORDS.contains(word))
        .map(str::to_string)
        .collect()
}

/// True when any directive in `proposed` contradicts any in `existing`.
pub fn contradicts(proposed: &str, existing: &str) -> bool {
    let existing = extract_directives(existing);
    extract_directives(proposed)
        .iter()
        .any(|a| existing.iter().any(|b| a.contradicts(b)))
}

/// True when any pair of directives duplicates at `threshold`.
pub fn duplicates(proposed: &[Directive], existing: &[Directive], threshold: usize) -> bool {
    proposed
        .iter()
        .any(|a| existing.iter().any(|b| a.duplicates(b, threshold)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_extract_positive_directive() {
        let directives = extract_directives("The operator shall provide notice to the consumer.");

        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].verb, "shall");
        assert!(!directives[0].negated);
        assert_eq!(directives[0].keywords, keywords(&["provide", "notice", "consumer"]));
    }

    #[test]
    fn test_negated_directive_is_not_doubled() {
        let directives = extract_directives("The operator shall not  provide notice.");

        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].verb, "shall not");
        assert!(directives[0].negated);
    }

    #[test]
    fn test_multiple_sentences() {
        let directives =
            extract_directives("A covered entity must retain records; it is prohibited from selling data.");

        assert_eq!(directives.len(), 2);
        assert!(directives.iter().any(|d| d.negated && d.keywords.contains("selling")));
        assert!(directives.iter().any(|d| !d.negated && d.keywords.contains("records")));
    }

    #[test]
    fn test_contradiction_requires_overlap() {
        assert!(contradicts("shall not provide notice", "shall provide notice"));
        assert!(!contradicts("shall not sell data", "shall provide notice"));
        assert!(!contradicts("shall provide notice", "shall provide notice"));
        assert!(!contradicts("no directive here", "shall provide notice"));
    }

    #[test]
    fn test_duplicate_threshold() {
        let proposed = extract_directives("shall maintain accurate records");
        let existing = extract_directives("must maintain records of requests");

        assert!(duplicates(&proposed, &existing, 2));
        assert!(!duplicates(&proposed, &existing, 3));
    }

    #[test]
    fn test_stop_words_and_short_words_dropped() {
        assert_eq!(
            subject_keywords("provide all of the (notices) to it"),
            keywords(&["provide", "notices"])
        );
    }
}
