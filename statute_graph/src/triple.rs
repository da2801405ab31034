//! Triple definitions - the atomic facts of the statute graph.

use serde::{Deserialize, Serialize};

use crate::{GraphError, Result};

/// A single (subject, predicate, object) statement.
///
/// Triples order by subject, then predicate, then object, which gives every
/// store listing a stable order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    /// Create a new triple.
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Reject triples with any empty component.
    pub fn validate(&self) -> Result<()> {
        if self.subject.is_empty() {
            return Err(GraphError::EmptyComponent("subject"));
        }
        if self.predicate.is_empty() {
            return Err(GraphError::EmptyComponent("predicate"));
        }
        if self.object.is_empty() {
            return Err(GraphError::EmptyComponent("object"));
        }
        Ok(())
    }

    /// Check whether this triple matches a pattern where empty strings are wildcards.
    pub fn matches(&self, subject: &str, predicate: &str, object: &str) -> bool {
        (subject.is_empty() || self.subject == subject)
            && (predicate.is_empty() || self.predicate == predicate)
            && (object.is_empty() || self.object == object)
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}> {} <{}>", self.subject, self.predicate, self.object)
    }
}
