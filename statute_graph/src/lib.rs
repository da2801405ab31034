//! # Statute Graph
//!
//! The "codified law" crate - holds the knowledge graph of existing statutes and
//! everything needed to read it. This crate is the single source of truth for
//! graph data and does not contain any amendment analysis logic.
//!
//! ## Core Components
//!
//! - **store**: Indexed in-memory triple store with wildcard queries and traversal
//! - **library**: Document catalogue that hands out per-document graph snapshots
//! - **extract**: Reference and semantic extractors that turn provision text into records
//! - **vocab**: Predicate and class names shared by ingestion and analysis

pub mod error;
pub mod extract;
pub mod library;
pub mod store;
pub mod triple;
pub mod vocab;

pub use error::*;
pub use extract::*;
pub use library::*;
pub use store::*;
pub use triple::*;
