//! Vocabulary - predicate and class names used in the statute graph.
//!
//! Ingestion and analysis must agree on these names; a provision ingested with
//! one spelling is invisible to queries using another.

pub const RDF_TYPE: &str = "rdf:type";
pub const RDFS_LABEL: &str = "rdfs:label";

pub const TITLE: &str = "reg:title";
pub const TEXT: &str = "reg:text";
pub const NUMBER: &str = "reg:number";
pub const TERM: &str = "reg:term";

// Hierarchy
pub const PART_OF: &str = "reg:partOf";
pub const CONTAINS: &str = "reg:contains";
pub const BELONGS_TO: &str = "reg:belongsTo";
pub const HAS_ARTICLE: &str = "reg:hasArticle";

// Cross-references
pub const REFERENCES: &str = "reg:references";
pub const REFERENCED_BY: &str = "reg:referencedBy";
pub const REFERS_TO_ARTICLE: &str = "reg:refersToArticle";
pub const REFERS_TO_CHAPTER: &str = "reg:refersToChapter";
pub const REFERS_TO_PARAGRAPH: &str = "reg:refersToParagraph";
pub const REFERS_TO_POINT: &str = "reg:refersToPoint";
pub const RESOLVED_TARGET: &str = "reg:resolvedTarget";

/// Typed reference predicates, in addition to `reg:references`.
pub const TYPED_REFERENCES: [&str; 4] = [
    REFERS_TO_ARTICLE,
    REFERS_TO_CHAPTER,
    REFERS_TO_PARAGRAPH,
    REFERS_TO_POINT,
];

// Semantics
pub const GRANTS_RIGHT: &str = "reg:grantsRight";
pub const IMPOSES_OBLIGATION: &str = "reg:imposesObligation";
pub const RIGHT_TYPE: &str = "reg:rightType";
pub const OBLIGATION_TYPE: &str = "reg:obligationType";
pub const TEMPORAL_KIND: &str = "reg:temporalKind";

// Classes
pub const CLASS_ARTICLE: &str = "reg:Article";
pub const CLASS_OBLIGATION: &str = "reg:Obligation";
pub const CLASS_RIGHT: &str = "reg:Right";

/// Base URI used when a library does not declare its own.
pub const DEFAULT_BASE_URI: &str = "https://regula.dev/regulations/";

/// Last segment of a URI after `:`, `/` or `#`, used as a display label.
pub fn uri_label(uri: &str) -> &str {
    match uri.rfind(|c: char| matches!(c, ':' | '/' | '#')) {
        Some(idx) => &uri[idx + 1..],
        None => uri,
    }
}

/// Ensure a base URI ends in `/` or `#` so identifiers can be appended.
pub fn normalize_base_uri(base_uri: &str) -> String {
    let base = if base_uri.is_empty() {
        DEFAULT_BASE_URI
    } else {
        base_uri
    };
    if base.ends_with('/') || base.ends_with('#') {
        base.to_string()
    } else {
        format!("{}/", base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_label_takes_last_segment() {
        assert_eq!(
            uri_label("https://regula.dev/regulations/US-USC-TITLE-15:Art6502"),
            "Art6502"
        );
        assert_eq!(uri_label("http://example.org/doc#Section3"), "Section3");
        assert_eq!(uri_label("plain"), "plain");
    }

    #[test]
    fn test_normalize_base_uri() {
        assert_eq!(normalize_base_uri("http://x.org/reg"), "http://x.org/reg/");
        assert_eq!(normalize_base_uri("http://x.org/reg#"), "http://x.org/reg#");
        assert_eq!(normalize_base_uri(""), DEFAULT_BASE_URI);
    }
}
