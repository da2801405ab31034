//! Regex-table extractors covering the common privacy-law vocabulary.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    AnnotationKind, ExtractedReference, ReferenceExtractor, ReferenceKind, SemanticAnnotation,
    SemanticExtractor,
};

static INTERNAL_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:section|article)\s+(\d+)").expect("Invalid internal reference regex")
});

static EXTERNAL_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+)\s+U\.?S\.?C\.?\s*§?\s*(\d+[a-z]?)")
        .expect("Invalid external reference regex")
});

/// Right types in match order. Only the first match per type is reported.
static RIGHT_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("RightOfAccess", r"(?i)right\s+(?:of\s+)?access"),
        ("RightToRectification", r"(?i)right\s+to\s+(?:obtain\s+|request\s+)?(?:rectification|correction)"),
        ("RightToErasure", r"(?i)right\s+to\s+(?:obtain\s+)?erasure|right\s+to\s+be\s+forgotten"),
        ("RightToDataPortability", r"(?i)right\s+to\s+data\s+portability"),
        ("RightToObject", r"(?i)right\s+to\s+object"),
        ("RightToOptOut", r"(?i)right\s+(?:to\s+)?opt[- ]?out"),
        ("RightToDelete", r"(?i)right\s+to\s+(?:request\s+)?delet(?:e|ion)"),
        ("RightToInformation", r"(?i)right\s+to\s+(?:obtain\s+|receive\s+)?(?:the\s+)?information|right\s+to\s+be\s+(?:informed|notified)"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("Invalid right regex")))
    .collect()
});

/// Obligation types in match order. Only the first match per type is reported.
static OBLIGATION_PATTERNS: Lazy<Vec<(&'static str, AnnotationKind, Regex)>> = Lazy::new(|| {
    [
        ("DisclosureProhibition", AnnotationKind::Prohibition, r"(?i)(?:shall|must|may)\s+not\s+(?:disclose|sell|transfer)"),
        ("RecordKeepingObligation", AnnotationKind::Obligation, r"(?i)(?:shall|must)\s+(?:maintain|keep)\s+(?:a\s+)?records?"),
        ("SecurityObligation", AnnotationKind::Obligation, r"(?i)(?:shall|must)\s+implement\s+(?:appropriate\s+)?(?:technical\s+and\s+organi[sz]ational\s+)?(?:security\s+)?measures"),
        ("BreachNotificationObligation", AnnotationKind::Obligation, r"(?i)notify\s+(?:the\s+)?(?:\w+\s+)?(?:of\s+(?:the|a|any)\s+)?(?:personal\s+data\s+|security\s+)?breach"),
        ("InformationProvisionObligation", AnnotationKind::Obligation, r"(?i)(?:shall|must)\s+provide\s+(?:the\s+)?(?:following\s+)?(?:information|notice)"),
        ("DataMinimizationObligation", AnnotationKind::Obligation, r"(?i)(?:shall\s+)?(?:not\s+)?collect\s+.*(?:more\s+than|necessary|reasonably)"),
    ]
    .into_iter()
    .map(|(name, kind, pattern)| (name, kind, Regex::new(pattern).expect("Invalid obligation regex")))
    .collect()
});

static GENERIC_OBLIGATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:shall|must|is\s+required\s+to)\s+\w+")
        .expect("Invalid generic obligation regex")
});

/// Reference extractor backed by section/article and U.S.C. citation patterns.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternReferenceExtractor;

impl PatternReferenceExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ReferenceExtractor for PatternReferenceExtractor {
    fn extract_references(&self, text: &str) -> Vec<ExtractedReference> {
        let mut references: Vec<ExtractedReference> = EXTERNAL_REFERENCE
            .find_iter(text)
            .map(|m| ExtractedReference {
                kind: ReferenceKind::External,
                article: None,
                text: m.as_str().to_string(),
            })
            .collect();

        references.extend(INTERNAL_REFERENCE.captures_iter(text).map(|caps| {
            ExtractedReference {
                kind: ReferenceKind::Internal,
                article: caps[1].parse().ok(),
                text: caps[0].to_string(),
            }
        }));

        references
    }
}

/// Semantic extractor backed by fixed right and obligation pattern tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternSemanticExtractor;

impl PatternSemanticExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl SemanticExtractor for PatternSemanticExtractor {
    fn extract_annotations(&self, text: &str) -> Vec<SemanticAnnotation> {
        let mut annotations: Vec<SemanticAnnotation> = RIGHT_PATTERNS
            .iter()
            .filter_map(|(name, re)| re.find(text).map(|m| SemanticAnnotation::right(*name, m.as_str())))
            .collect();

        let mut found_obligation = false;
        for (name, kind, re) in OBLIGATION_PATTERNS.iter() {
            if let Some(m) = re.find(text) {
                annotations.push(SemanticAnnotation::obligation(*kind, *name, m.as_str()));
                found_obligation = true;
            }
        }

        // Fall back to a generic obligation when nothing more specific matched
        if !found_obligation {
            if let Some(m) = GENERIC_OBLIGATION.find(text) {
                annotations.push(SemanticAnnotation::obligation(
                    AnnotationKind::Obligation,
                    "Obligation",
                    m.as_str(),
                ));
            }
        }

        annotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_and_external_references() {
        let extractor = PatternReferenceExtractor::new();
        let refs = extractor.extract_references(
            "as described in section 1302 and under 15 U.S.C. 6502",
        );

        let internal: Vec<_> = refs.iter().filter(|r| r.kind == ReferenceKind::Internal).collect();
        assert_eq!(internal.len(), 1);
        assert_eq!(internal[0].article, Some(1302));
        assert!(refs.iter().any(|r| r.kind == ReferenceKind::External));
    }

    #[test]
    fn test_no_references_in_plain_text() {
        let extractor = PatternReferenceExtractor::new();
        assert!(extractor.extract_references("nothing to see here").is_empty());
    }

    #[test]
    fn test_rights_extraction() {
        let extractor = PatternSemanticExtractor::new();
        let annotations = extractor.extract_annotations(
            "A consumer has the right of access and the right to opt-out of sale.",
        );
        let rights: Vec<_> = annotations
            .iter()
            .filter_map(|a| a.right_type.as_deref())
            .collect();
        assert_eq!(rights, vec!["RightOfAccess", "RightToOptOut"]);
    }

    #[test]
    fn test_specific_obligation_suppresses_generic() {
        let extractor = PatternSemanticExtractor::new();
        let annotations =
            extractor.extract_annotations("The operator shall maintain records of each request.");
        assert_eq!(annotations.len(), 1);
        assert_eq!(
            annotations[0].obligation_type.as_deref(),
            Some("RecordKeepingObligation")
        );
    }

    #[test]
    fn test_prohibition_kind() {
        let extractor = PatternSemanticExtractor::new();
        let annotations = extractor.extract_annotations("A business shall not sell personal data.");
        assert!(annotations
            .iter()
            .any(|a| a.kind == AnnotationKind::Prohibition));
    }

    #[test]
    fn test_generic_obligation_fallback() {
        let extractor = PatternSemanticExtractor::new();
        let annotations = extractor.extract_annotations("The Commission shall publish guidance.");
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].obligation_type.as_deref(), Some("Obligation"));
    }
}
