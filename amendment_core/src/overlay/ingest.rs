//! Provision ingestion - turns proposed text into graph facts.
//!
//! NLP is delegated to the extractors; this module only re-expresses their
//! records as triples attached to the new provision node.

use std::sync::Arc;

use statute_graph::{
    vocab, AnnotationKind, PatternReferenceExtractor, PatternSemanticExtractor, ReferenceExtractor,
    ReferenceKind, SemanticExtractor, TripleStore,
};

use crate::bill::Amendment;
use crate::diff::{provision_uri, regulation_uri};

/// Ingests amendment text as a provision, using pluggable extractors.
#[derive(Clone)]
pub struct ProvisionIngester {
    references: Arc<dyn ReferenceExtractor>,
    semantics: Arc<dyn SemanticExtractor>,
}

impl ProvisionIngester {
    /// Create an ingester from explicit extractors.
    pub fn new(references: Arc<dyn ReferenceExtractor>, semantics: Arc<dyn SemanticExtractor>) -> Self {
        Self {
            references,
            semantics,
        }
    }

    /// Create an ingester backed by the pattern-table extractors.
    pub fn with_defaults() -> Self {
        Self::new(
            Arc::new(PatternReferenceExtractor::new()),
            Arc::new(PatternSemanticExtractor::new()),
        )
    }

    /// Add the amendment's insert text to `graph` as a provision node.
    ///
    /// Returns the number of new facts. An amendment with no insert text adds
    /// nothing.
    pub fn ingest(
        &self,
        amendment: &Amendment,
        graph: &mut TripleStore,
        base_uri: &str,
        document_id: &str,
    ) -> statute_graph::Result<usize> {
        let Some(text) = amendment.insert_text.as_deref().filter(|t| !t.is_empty()) else {
            return Ok(0);
        };
        let before = graph.count();

        let section = amendment.target.section.as_deref().unwrap_or_default();
        let reg_uri = regulation_uri(base_uri, document_id);
        let article_uri = provision_uri(
            base_uri,
            document_id,
            section,
            amendment.target.subsection.as_deref(),
        );

        // Identity
        graph.add(&article_uri, vocab::RDF_TYPE, vocab::CLASS_ARTICLE)?;
        graph.add(&article_uri, vocab::NUMBER, section)?;
        graph.add(&article_uri, vocab::TEXT, text)?;

        // Hierarchy
        graph.add(&article_uri, vocab::PART_OF, &reg_uri)?;
        graph.add(&article_uri, vocab::BELONGS_TO, &reg_uri)?;
        graph.add(&reg_uri, vocab::CONTAINS, &article_uri)?;
        graph.add(&reg_uri, vocab::HAS_ARTICLE, &article_uri)?;

        for reference in self.references.extract_references(text) {
            let (ReferenceKind::Internal, Some(article)) = (reference.kind, reference.article) else {
                continue;
            };
            let target_uri = format!("{reg_uri}:Art{article}");
            graph.add(&article_uri, vocab::REFERENCES, &target_uri)?;
            graph.add(&target_uri, vocab::REFERENCED_BY, &article_uri)?;
        }

        for annotation in self.semantics.extract_annotations(text) {
            match annotation.kind {
                AnnotationKind::Right => {
                    let right_type = annotation.right_type.unwrap_or_default();
                    let right_uri = format!("{reg_uri}:Right:{section}:{right_type}");
                    graph.add(&right_uri, vocab::RDF_TYPE, vocab::CLASS_RIGHT)?;
                    graph.add(&right_uri, vocab::RIGHT_TYPE, &right_type)?;
                    graph.add(&right_uri, vocab::TEXT, &annotation.matched_text)?;
                    graph.add(&right_uri, vocab::PART_OF, &article_uri)?;
                    graph.add(&article_uri, vocab::GRANTS_RIGHT, &right_uri)?;
                }
                AnnotationKind::Obligation | AnnotationKind::Prohibition => {
                    let obligation_type = annotation.obligation_type.unwrap_or_default();
                    let obligation_uri = format!("{reg_uri}:Obligation:{section}:{obligation_type}");
                    graph.add(&obligation_uri, vocab::RDF_TYPE, vocab::CLASS_OBLIGATION)?;
                    graph.add(&obligation_uri, vocab::OBLIGATION_TYPE, &obligation_type)?;
                    graph.add(&obligation_uri, vocab::TEXT, &annotation.matched_text)?;
                    graph.add(&obligation_uri, vocab::PART_OF, &article_uri)?;
                    graph.add(&article_uri, vocab::IMPOSES_OBLIGATION, &obligation_uri)?;
                }
            }
        }

        Ok(graph.count() - before)
    }
}

impl Default for ProvisionIngester {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ProvisionIngester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionIngester").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::{AmendmentKind, TargetRef};
    use crate::testing::*;

    #[test]
    fn test_ingest_builds_provision_facts() {
        let ingester = ProvisionIngester::with_defaults();
        let mut graph = TripleStore::new();
        let amendment = Amendment::new(AmendmentKind::AddNewSection, TargetRef::new("15", "9"))
            .with_insert_text(
                "Subject to section 2, the operator shall maintain records and a consumer has the right to opt-out.",
            );

        let added = ingester
            .ingest(&amendment, &mut graph, vocab::DEFAULT_BASE_URI, DOC)
            .unwrap();

        let article = art_uri("9");
        assert_eq!(added, graph.count());
        assert!(graph.contains(&article, vocab::RDF_TYPE, vocab::CLASS_ARTICLE));
        assert!(graph.contains(&article, vocab::PART_OF, &reg_uri()));
        assert!(graph.contains(&reg_uri(), vocab::HAS_ARTICLE, &article));
        assert!(graph.contains(&article, vocab::REFERENCES, &art_uri("2")));
        assert!(graph.contains(&art_uri("2"), vocab::REFERENCED_BY, &article));
        assert!(graph.contains(
            &article,
            vocab::IMPOSES_OBLIGATION,
            &obligation_uri("9", "RecordKeepingObligation")
        ));
        assert!(graph.contains(&article, vocab::GRANTS_RIGHT, &right_uri("9", "RightToOptOut")));
    }

    #[test]
    fn test_ingest_without_text_adds_nothing() {
        let ingester = ProvisionIngester::with_defaults();
        let mut graph = TripleStore::new();
        let amendment = Amendment::new(AmendmentKind::AddAtEnd, TargetRef::new("15", "9"));
        assert_eq!(
            ingester.ingest(&amendment, &mut graph, vocab::DEFAULT_BASE_URI, DOC).unwrap(),
            0
        );
        assert!(graph.is_empty());
    }
}
