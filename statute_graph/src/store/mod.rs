//! Triple Store - the indexed in-memory statute graph.
//!
//! The store keeps three ordered indexes so that every query shape is answered
//! from an index rather than a scan:
//! - **spo**: subject -> predicate -> objects
//! - **pos**: predicate -> object -> subjects
//! - **osp**: object -> subject -> predicates
//!
//! Ordered maps keep query results deterministic across runs.

mod traverse;

pub use traverse::*;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::vocab;
use crate::{Result, Triple};

type Index = BTreeMap<String, BTreeMap<String, BTreeSet<String>>>;

/// In-memory triple store with wildcard pattern queries.
///
/// Cloning produces a fully independent copy, which is how snapshots are
/// mutated without touching their source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Triple>", into = "Vec<Triple>")]
pub struct TripleStore {
    spo: Index,
    pos: Index,
    osp: Index,
    len: usize,
}

impl TripleStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a triple. Returns `Ok(false)` if it was already present.
    pub fn add(
        &mut self,
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Result<bool> {
        self.insert(Triple::new(subject, predicate, object))
    }

    /// Insert an owned triple, rejecting empty components.
    pub fn insert(&mut self, triple: Triple) -> Result<bool> {
        triple.validate()?;

        if !Self::index(&mut self.spo, &triple.subject, &triple.predicate, &triple.object) {
            return Ok(false);
        }
        Self::index(&mut self.pos, &triple.predicate, &triple.object, &triple.subject);
        Self::index(&mut self.osp, &triple.object, &triple.subject, &triple.predicate);
        self.len += 1;
        Ok(true)
    }

    /// Add many triples, silently skipping invalid ones.
    ///
    /// Returns the number of triples actually inserted.
    pub fn bulk_add(&mut self, triples: impl IntoIterator<Item = Triple>) -> usize {
        triples
            .into_iter()
            .filter_map(|triple| self.insert(triple).ok())
            .filter(|inserted| *inserted)
            .count()
    }

    /// Copy every triple of another store into this one.
    pub fn merge_from(&mut self, other: &TripleStore) -> usize {
        self.bulk_add(other.all())
    }

    /// Remove a single triple.
    pub fn remove(&mut self, triple: &Triple) -> bool {
        if !Self::unindex(&mut self.spo, &triple.subject, &triple.predicate, &triple.object) {
            return false;
        }
        Self::unindex(&mut self.pos, &triple.predicate, &triple.object, &triple.subject);
        Self::unindex(&mut self.osp, &triple.object, &triple.subject, &triple.predicate);
        self.len -= 1;
        true
    }

    /// Delete every triple matching the pattern (empty string = wildcard).
    ///
    /// Returns the number of triples removed.
    pub fn delete(&mut self, subject: &str, predicate: &str, object: &str) -> usize {
        self.find(subject, predicate, object)
            .iter()
            .filter(|triple| self.remove(triple))
            .count()
    }

    /// Find all triples matching the pattern (empty string = wildcard).
    pub fn find(&self, subject: &str, predicate: &str, object: &str) -> Vec<Triple> {
        if !subject.is_empty() {
            self.spo
                .get(subject)
                .map(|by_predicate| {
                    by_predicate
                        .iter()
                        .filter(|(p, _)| predicate.is_empty() || p.as_str() == predicate)
                        .flat_map(|(p, objects)| {
                            objects
                                .iter()
                                .filter(|o| object.is_empty() || o.as_str() == object)
                                .map(move |o| Triple::new(subject, p.as_str(), o.as_str()))
                        })
                        .collect()
                })
                .unwrap_or_default()
        } else if !predicate.is_empty() {
            self.pos
                .get(predicate)
                .map(|by_object| {
                    by_object
                        .iter()
                        .filter(|(o, _)| object.is_empty() || o.as_str() == object)
                        .flat_map(|(o, subjects)| {
                            subjects
                                .iter()
                                .map(move |s| Triple::new(s.as_str(), predicate, o.as_str()))
                        })
                        .collect()
                })
                .unwrap_or_default()
        } else if !object.is_empty() {
            self.osp
                .get(object)
                .map(|by_subject| {
                    by_subject
                        .iter()
                        .flat_map(|(s, predicates)| {
                            predicates
                                .iter()
                                .map(move |p| Triple::new(s.as_str(), p.as_str(), object))
                        })
                        .collect()
                })
                .unwrap_or_default()
        } else {
            self.all()
        }
    }

    /// Check whether a specific triple is present.
    pub fn contains(&self, subject: &str, predicate: &str, object: &str) -> bool {
        self.spo
            .get(subject)
            .and_then(|by_predicate| by_predicate.get(predicate))
            .map(|objects| objects.contains(object))
            .unwrap_or(false)
    }

    /// Get the first object for a subject and predicate.
    pub fn get_one(&self, subject: &str, predicate: &str) -> Option<String> {
        self.spo
            .get(subject)
            .and_then(|by_predicate| by_predicate.get(predicate))
            .and_then(|objects| objects.iter().next().cloned())
    }

    /// All objects for a subject and predicate.
    pub fn objects(&self, subject: &str, predicate: &str) -> Vec<String> {
        self.spo
            .get(subject)
            .and_then(|by_predicate| by_predicate.get(predicate))
            .map(|objects| objects.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// All subjects pointing at an object through a predicate.
    pub fn subjects(&self, predicate: &str, object: &str) -> Vec<String> {
        self.pos
            .get(predicate)
            .and_then(|by_object| by_object.get(object))
            .map(|subjects| subjects.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Get all triples in subject order.
    pub fn all(&self) -> Vec<Triple> {
        self.spo
            .iter()
            .flat_map(|(s, by_predicate)| {
                by_predicate.iter().flat_map(move |(p, objects)| {
                    objects
                        .iter()
                        .map(move |o| Triple::new(s.as_str(), p.as_str(), o.as_str()))
                })
            })
            .collect()
    }

    /// Get the total number of triples.
    pub fn count(&self) -> usize {
        self.len
    }

    /// Check if the store holds no triples.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Human-readable label: `reg:title`, then `rdfs:label`, then the URI's last segment.
    pub fn label_for(&self, uri: &str) -> String {
        self.get_one(uri, vocab::TITLE)
            .or_else(|| self.get_one(uri, vocab::RDFS_LABEL))
            .unwrap_or_else(|| vocab::uri_label(uri).to_string())
    }

    fn index(index: &mut Index, first: &str, second: &str, third: &str) -> bool {
        index
            .entry(first.to_string())
            .or_default()
            .entry(second.to_string())
            .or_default()
            .insert(third.to_string())
    }

    fn unindex(index: &mut Index, first: &str, second: &str, third: &str) -> bool {
        let Some(by_second) = index.get_mut(first) else {
            return false;
        };

        let removed = match by_second.get_mut(second) {
            Some(values) => {
                let removed = values.remove(third);
                if values.is_empty() {
                    by_second.remove(second);
                }
                removed
            }
            None => false,
        };

        if by_second.is_empty() {
            index.remove(first);
        }
        removed
    }
}

impl From<Vec<Triple>> for TripleStore {
    fn from(triples: Vec<Triple>) -> Self {
        let mut store = TripleStore::new();
        store.bulk_add(triples);
        store
    }
}

impl From<TripleStore> for Vec<Triple> {
    fn from(store: TripleStore) -> Self {
        store.all()
    }
}

impl FromIterator<Triple> for TripleStore {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut store = TripleStore::new();
        store.bulk_add(iter);
        store
    }
}
