//! Shared fixtures for unit tests.
//!
//! The standard graph is one document, `us-usc-title-15`:
//!
//! ```text
//! Art3 --references--> Art2 --references--> Art1
//! Art1 imposes an information-provision obligation
//! Art4 grants a right of access
//! ```

use statute_graph::{vocab, DocumentEntry, MemoryLibrary, TripleStore};

use crate::bill::{Amendment, AmendmentKind, Bill, BillSection, TargetRef};
use crate::diff::provision_uri;

pub(crate) const DOC: &str = "us-usc-title-15";

pub(crate) fn art_uri(section: &str) -> String {
    provision_uri(vocab::DEFAULT_BASE_URI, DOC, section, None)
}

pub(crate) fn obligation_uri(section: &str, obligation_type: &str) -> String {
    format!("{}:Obligation:{section}:{obligation_type}", reg_uri())
}

pub(crate) fn right_uri(section: &str, right_type: &str) -> String {
    format!("{}:Right:{section}:{right_type}", reg_uri())
}

pub(crate) fn reg_uri() -> String {
    format!("{}{}", vocab::DEFAULT_BASE_URI, DOC.to_uppercase())
}

pub(crate) fn add_article(graph: &mut TripleStore, section: &str, text: &str) {
    let uri = art_uri(section);
    graph.add(&uri, vocab::RDF_TYPE, vocab::CLASS_ARTICLE).unwrap();
    graph.add(&uri, vocab::NUMBER, section).unwrap();
    graph.add(&uri, vocab::TEXT, text).unwrap();
    graph.add(&uri, vocab::PART_OF, reg_uri()).unwrap();
    graph.add(reg_uri(), vocab::CONTAINS, &uri).unwrap();
}

pub(crate) fn add_reference(graph: &mut TripleStore, from: &str, to: &str) {
    graph.add(art_uri(from), vocab::REFERENCES, art_uri(to)).unwrap();
}

pub(crate) fn add_obligation(graph: &mut TripleStore, section: &str, obligation_type: &str, text: &str) {
    let uri = obligation_uri(section, obligation_type);
    graph.add(&uri, vocab::RDF_TYPE, vocab::CLASS_OBLIGATION).unwrap();
    graph.add(&uri, vocab::OBLIGATION_TYPE, obligation_type).unwrap();
    graph.add(&uri, vocab::TEXT, text).unwrap();
    graph.add(&uri, vocab::PART_OF, art_uri(section)).unwrap();
    graph.add(art_uri(section), vocab::IMPOSES_OBLIGATION, &uri).unwrap();
}

pub(crate) fn add_right(graph: &mut TripleStore, section: &str, right_type: &str, text: &str) {
    let uri = right_uri(section, right_type);
    graph.add(&uri, vocab::RDF_TYPE, vocab::CLASS_RIGHT).unwrap();
    graph.add(&uri, vocab::RIGHT_TYPE, right_type).unwrap();
    graph.add(&uri, vocab::TEXT, text).unwrap();
    graph.add(&uri, vocab::PART_OF, art_uri(section)).unwrap();
    graph.add(art_uri(section), vocab::GRANTS_RIGHT, &uri).unwrap();
}

pub(crate) fn setup_graph() -> TripleStore {
    let mut graph = TripleStore::new();
    add_article(&mut graph, "1", "The operator shall provide notice to the consumer.");
    add_article(&mut graph, "2", "Except as provided in section 1, records are confidential.");
    add_article(&mut graph, "3", "Section 2 applies to all operators.");
    add_article(&mut graph, "4", "A consumer has the right to access personal data.");
    add_reference(&mut graph, "2", "1");
    add_reference(&mut graph, "3", "2");
    add_obligation(
        &mut graph,
        "1",
        "InformationProvisionObligation",
        "shall provide notice to the consumer",
    );
    add_right(&mut graph, "4", "RightOfAccess", "has the right to access personal data");
    graph
}

pub(crate) fn library_with(graph: TripleStore) -> MemoryLibrary {
    MemoryLibrary::with_defaults().with_document(DocumentEntry::new(DOC, "Title 15"), graph)
}

pub(crate) fn setup_library() -> MemoryLibrary {
    library_with(setup_graph())
}

pub(crate) fn bill_with(amendments: Vec<Amendment>) -> Bill {
    let section = amendments
        .into_iter()
        .fold(BillSection::new("2", "Amendments", ""), BillSection::with_amendment);
    Bill::new("H.R. 1234", "Test Act").with_section(section)
}

pub(crate) fn repeal(section: &str) -> Amendment {
    Amendment::new(AmendmentKind::Repeal, TargetRef::new("15", section))
}

pub(crate) fn strike_insert(section: &str, strike: &str, insert: &str) -> Amendment {
    Amendment::new(AmendmentKind::StrikeInsert, TargetRef::new("15", section))
        .with_strike_text(strike)
        .with_insert_text(insert)
}

pub(crate) fn add_at_end(section: &str, text: &str) -> Amendment {
    Amendment::new(AmendmentKind::AddAtEnd, TargetRef::new("15", section)).with_insert_text(text)
}
