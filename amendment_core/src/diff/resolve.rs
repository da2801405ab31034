//! Target resolution and per-target graph measurements.

use statute_graph::{vocab, Library, TripleStore};

use crate::bill::Amendment;
use crate::config::GraphConfig;
use crate::error::ResolveError;

/// An amendment target mapped onto the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub uri: String,
    pub document_id: String,
}

/// Document id for a title, e.g. `us-usc-title-15`.
pub fn document_id(jurisdiction: &str, title: &str) -> String {
    format!("{}-title-{}", jurisdiction.trim(), title.trim()).to_lowercase()
}

/// Regulation URI for a document: base URI plus the upper-cased document id.
pub fn regulation_uri(base_uri: &str, document_id: &str) -> String {
    format!("{}{}", vocab::normalize_base_uri(base_uri), document_id.to_uppercase())
}

/// Provision URI, e.g. `.../US-USC-TITLE-15:Art6502(b)`.
pub fn provision_uri(
    base_uri: &str,
    document_id: &str,
    section: &str,
    subsection: Option<&str>,
) -> String {
    let mut uri = format!("{}:Art{}", regulation_uri(base_uri, document_id), section);
    if let Some(sub) = subsection {
        if sub.starts_with('(') {
            uri.push_str(sub);
        } else {
            uri.push('(');
            uri.push_str(sub);
            uri.push(')');
        }
    }
    uri
}

/// Map an amendment onto a provision URI and owning document.
pub fn resolve_target(
    amendment: &Amendment,
    library: &dyn Library,
    config: &GraphConfig,
) -> Result<ResolvedTarget, ResolveError> {
    let target = &amendment.target;
    if target.title.trim().is_empty() {
        return Err(ResolveError::MissingTitle);
    }
    let section = target
        .section
        .as_deref()
        .filter(|section| !section.trim().is_empty())
        .ok_or(ResolveError::MissingSection)?;

    let document_id = document_id(&config.jurisdiction, &target.title);
    if library.get_document(&document_id).is_none() {
        return Err(ResolveError::DocumentNotFound(document_id));
    }

    let base_uri = match library.base_uri() {
        "" => config.base_uri.as_str(),
        base => base,
    };

    Ok(ResolvedTarget {
        uri: provision_uri(base_uri, &document_id, section, target.subsection.as_deref()),
        document_id,
    })
}

/// Facts with the target at either end.
///
/// A self-referential fact is counted from both sides. The over-count is kept
/// so totals stay comparable across runs.
pub fn count_affected_triples(target_uri: &str, graph: &TripleStore) -> usize {
    graph.find(target_uri, "", "").len() + graph.find("", "", target_uri).len()
}

/// Incoming and outgoing cross-references, checking `references` and its
/// inverse `referencedBy`. Each list is deduplicated in first-seen order.
pub fn find_cross_references(target_uri: &str, graph: &TripleStore) -> (Vec<String>, Vec<String>) {
    let incoming = dedup(
        graph
            .subjects(vocab::REFERENCES, target_uri)
            .into_iter()
            .chain(graph.objects(target_uri, vocab::REFERENCED_BY)),
    );
    let outgoing = dedup(
        graph
            .objects(target_uri, vocab::REFERENCES)
            .into_iter()
            .chain(graph.subjects(vocab::REFERENCED_BY, target_uri)),
    );
    (incoming, outgoing)
}

pub(crate) fn dedup(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
