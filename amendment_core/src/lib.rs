//! # Amendment Core (Redline)
//!
//! The "brain" of the amendment analyzer. This crate reads proposed bills,
//! resolves their amendments against the codified law held by
//! `statute_graph`, and explains what would change if they were enacted.
//!
//! ## Core Components
//!
//! - **recognizer**: Extracts amendment directives from free-form clause text
//! - **diff**: Resolves directives to graph nodes and classifies each change
//! - **overlay**: Applies a diff to cloned snapshots as a "proposed law" view
//! - **impact**: Depth-limited traversal from every changed provision
//! - **conflicts**: Obligation and rights clashes between bill and existing law
//! - **crossref**: Cross-references a bill would break
//! - **temporal**: Effective dates, gaps, retroactivity and sunsets
//! - **assessment**: The full pipeline with an overall risk level
//!
//! ## Design Philosophy
//!
//! - **Read-Only Law**: Libraries are never mutated; every change happens on a clone
//! - **Resilient**: An amendment that cannot be resolved is recorded and skipped
//! - **Explainable**: Every finding carries a human-readable reason

pub mod assessment;
pub mod bill;
pub mod config;
pub mod conflicts;
pub mod crossref;
pub mod diff;
pub mod error;
pub mod finding;
pub mod impact;
pub mod overlay;
pub mod recognizer;
pub mod temporal;

#[cfg(test)]
mod testing;

pub use assessment::*;
pub use bill::*;
pub use config::*;
pub use conflicts::*;
pub use crossref::*;
pub use diff::*;
pub use error::*;
pub use finding::*;
pub use impact::*;
pub use overlay::*;
pub use recognizer::*;
pub use temporal::*;
