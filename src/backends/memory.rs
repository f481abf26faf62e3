// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-memory fact store.

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::ProducerError;
use crate::resolution::concept::{Concept, ConceptMap};
use crate::resolution::pattern::Atom;
use crate::traits::{Traversal, TraversalSource};

/// A stored relation instance, e.g. `parent(person:ann, person:bob)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub relation: String,
    pub args: Vec<Concept>,
}

impl Fact {
    pub fn new(relation: impl Into<String>, args: Vec<Concept>) -> Self {
        Self {
            relation: relation.into(),
            args,
        }
    }
}

/// Facts indexed by relation. Cheap to clone; cursors share the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    relations: Arc<HashMap<String, Vec<Vec<Concept>>>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identical facts are stored once.
    pub fn from_facts(facts: impl IntoIterator<Item = Fact>) -> Self {
        let mut relations: HashMap<String, Vec<Vec<Concept>>> = HashMap::new();
        for fact in facts {
            let stored = relations.entry(fact.relation).or_default();
            if !stored.contains(&fact.args) {
                stored.push(fact.args);
            }
        }
        Self {
            relations: Arc::new(relations),
        }
    }

    pub fn facts(&self, relation: &str) -> &[Vec<Concept>] {
        self.relations
            .get(relation)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.relations.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Traversal for MemoryGraph {
    fn traverse(
        &self,
        atoms: &[Atom],
        bounds: &ConceptMap,
    ) -> Result<Box<dyn TraversalSource<ConceptMap>>, ProducerError> {
        Ok(Box::new(JoinCursor {
            relations: Arc::clone(&self.relations),
            atoms: atoms.to_vec(),
            stack: vec![Frame {
                depth: 0,
                next_fact: 0,
                binding: bounds.clone(),
            }],
        }))
    }
}

struct Frame {
    /// number of atoms matched by `binding`
    depth: usize,
    next_fact: usize,
    binding: ConceptMap,
}

/// Lazy nested-loop join of the atoms, in plan order.
struct JoinCursor {
    relations: Arc<HashMap<String, Vec<Vec<Concept>>>>,
    atoms: Vec<Atom>,
    stack: Vec<Frame>,
}

impl Iterator for JoinCursor {
    type Item = Result<ConceptMap, ProducerError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.last_mut() {
            if frame.depth == self.atoms.len() {
                return self.stack.pop().map(|frame| Ok(frame.binding));
            }
            let atom = &self.atoms[frame.depth];
            let candidates = self
                .relations
                .get(atom.relation())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let Some(values) = candidates.get(frame.next_fact) else {
                self.stack.pop();
                continue;
            };
            frame.next_fact += 1;
            if let Some(binding) = atom.match_fact(atom.relation(), values, &frame.binding) {
                let depth = frame.depth + 1;
                self.stack.push(Frame {
                    depth,
                    next_fact: 0,
                    binding,
                });
            }
        }
        None
    }
}

impl TraversalSource<ConceptMap> for JoinCursor {
    fn recycle(&mut self) {
        self.stack.clear();
    }
}
