//! Extractors - turn raw provision text into reference and semantic records.
//!
//! Extractors only report what they find. Turning records into graph facts is
//! the job of whoever ingests them.

mod patterns;

pub use patterns::*;

use serde::{Deserialize, Serialize};

/// Whether a reference points inside the same document or elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Internal,
    External,
}

/// A cross-reference found in provision text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedReference {
    pub kind: ReferenceKind,
    /// Referenced article or section number, when it is numeric.
    pub article: Option<u32>,
    /// The matched source text.
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Right,
    Obligation,
    Prohibition,
}

/// A right, obligation or prohibition found in provision text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticAnnotation {
    pub kind: AnnotationKind,
    pub right_type: Option<String>,
    pub obligation_type: Option<String>,
    pub matched_text: String,
}

impl SemanticAnnotation {
    pub fn right(right_type: impl Into<String>, matched_text: impl Into<String>) -> Self {
        Self {
            kind: AnnotationKind::Right,
            right_type: Some(right_type.into()),
            obligation_type: None,
            matched_text: matched_text.into(),
        }
    }

    pub fn obligation(
        kind: AnnotationKind,
        obligation_type: impl Into<String>,
        matched_text: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            right_type: None,
            obligation_type: Some(obligation_type.into()),
            matched_text: matched_text.into(),
        }
    }
}

/// Finds cross-references in provision text.
pub trait ReferenceExtractor: Send + Sync {
    fn extract_references(&self, text: &str) -> Vec<ExtractedReference>;
}

/// Finds rights and obligations in provision text.
pub trait SemanticExtractor: Send + Sync {
    fn extract_annotations(&self, text: &str) -> Vec<SemanticAnnotation>;
}
