//! Reference traversal - depth-limited walks over cross-reference edges.
//!
//! The walk works level by level:
//! 1. **Seed**: The start node is marked visited
//! 2. **Direct**: Depth-1 neighbours through `references` / `referencedBy`
//!    (incoming) and `references` / `resolvedTarget` (outgoing)
//! 3. **Expand**: For each further depth, follow `references` from the previous
//!    frontier in the requested directions
//! 4. **Stop**: At `max_depth` or when the frontier is empty
//!
//! Every node is reported at most once, at the shallowest depth it was reached.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::TripleStore;
use crate::vocab;

/// Which reference edges a traversal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Provisions that reference the node.
    Incoming,
    /// Provisions the node references.
    Outgoing,
    #[default]
    Both,
}

impl Direction {
    pub fn includes_incoming(self) -> bool {
        matches!(self, Direction::Incoming | Direction::Both)
    }

    pub fn includes_outgoing(self) -> bool {
        matches!(self, Direction::Outgoing | Direction::Both)
    }
}

/// A node reached during a traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachedNode {
    pub uri: String,
    pub depth: u32,
    /// `Incoming` or `Outgoing`, relative to the node it was reached from.
    pub direction: Direction,
    /// The predicate of the edge that reached this node.
    pub predicate: String,
    /// The node this one was reached from.
    pub via: String,
}

/// Result of a depth-limited traversal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Traversal {
    pub start: String,
    pub max_depth: u32,
    pub direct_incoming: Vec<ReachedNode>,
    pub direct_outgoing: Vec<ReachedNode>,
    pub transitive: Vec<ReachedNode>,
}

impl Traversal {
    /// Deepest level at which any node was found (0 if none).
    pub fn max_depth_reached(&self) -> u32 {
        self.all_nodes().map(|node| node.depth).max().unwrap_or(0)
    }

    /// Number of nodes found at each depth.
    pub fn by_depth(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for node in self.all_nodes() {
            *counts.entry(node.depth).or_default() += 1;
        }
        counts
    }

    /// Total number of distinct nodes reached.
    pub fn len(&self) -> usize {
        self.direct_incoming.len() + self.direct_outgoing.len() + self.transitive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over every reached node, direct first.
    pub fn all_nodes(&self) -> impl Iterator<Item = &ReachedNode> {
        self.direct_incoming
            .iter()
            .chain(self.direct_outgoing.iter())
            .chain(self.transitive.iter())
    }
}

/// Bookkeeping shared by every level of a single traversal.
struct Walk<'a> {
    store: &'a TripleStore,
    visited: HashSet<String>,
}

impl Walk<'_> {
    fn visit(
        &mut self,
        found: &mut Vec<ReachedNode>,
        uri: String,
        depth: u32,
        direction: Direction,
        predicate: &str,
        via: &str,
    ) {
        if !self.visited.insert(uri.clone()) {
            return;
        }
        found.push(ReachedNode {
            uri,
            depth,
            direction,
            predicate: predicate.to_string(),
            via: via.to_string(),
        });
    }
}

impl TripleStore {
    /// Walk cross-references outward from `start` up to `max_depth` levels.
    ///
    /// A `max_depth` of 0 is treated as 1.
    pub fn traverse(&self, start: &str, max_depth: u32, direction: Direction) -> Traversal {
        let max_depth = max_depth.max(1);
        let mut walk = Walk {
            store: self,
            visited: HashSet::from([start.to_string()]),
        };
        let mut traversal = Traversal {
            start: start.to_string(),
            max_depth,
            ..Traversal::default()
        };

        // Step 1: direct neighbours
        if direction.includes_incoming() {
            for subject in self.subjects(vocab::REFERENCES, start) {
                walk.visit(
                    &mut traversal.direct_incoming,
                    subject,
                    1,
                    Direction::Incoming,
                    vocab::REFERENCES,
                    start,
                );
            }
            for object in self.objects(start, vocab::REFERENCED_BY) {
                walk.visit(
                    &mut traversal.direct_incoming,
                    object,
                    1,
                    Direction::Incoming,
                    vocab::REFERENCES,
                    start,
                );
            }
        }
        if direction.includes_outgoing() {
            for predicate in [vocab::REFERENCES, vocab::RESOLVED_TARGET] {
                for object in self.objects(start, predicate) {
                    walk.visit(
                        &mut traversal.direct_outgoing,
                        object,
                        1,
                        Direction::Outgoing,
                        predicate,
                        start,
                    );
                }
            }
        }

        // Step 2: expand level by level
        let mut frontier: Vec<String> = traversal
            .direct_incoming
            .iter()
            .chain(traversal.direct_outgoing.iter())
            .map(|node| node.uri.clone())
            .collect();

        for depth in 2..=max_depth {
            let first_new = traversal.transitive.len();

            for node in &frontier {
                if direction.includes_incoming() {
                    for subject in walk.store.subjects(vocab::REFERENCES, node) {
                        walk.visit(
                            &mut traversal.transitive,
                            subject,
                            depth,
                            Direction::Incoming,
                            vocab::REFERENCES,
                            node,
                        );
                    }
                }
                if direction.includes_outgoing() {
                    for object in walk.store.objects(node, vocab::REFERENCES) {
                        walk.visit(
                            &mut traversal.transitive,
                            object,
                            depth,
                            Direction::Outgoing,
                            vocab::REFERENCES,
                            node,
                        );
                    }
                }
            }

            frontier = traversal.transitive[first_new..]
                .iter()
                .map(|node| node.uri.clone())
                .collect();
            if frontier.is_empty() {
                break;
            }
        }

        traversal
    }
}
