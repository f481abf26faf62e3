// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Concepts and variable bindings.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A value a query variable can be bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Concept {
    /// An instance of a type in the graph, identified by its iid.
    Thing { type_label: String, iid: String },
    Long(i64),
    Text(String),
}

impl Concept {
    pub fn thing(type_label: impl Into<String>, iid: impl Into<String>) -> Self {
        Concept::Thing {
            type_label: type_label.into(),
            iid: iid.into(),
        }
    }

    /// The type label of a thing; values have none.
    pub fn type_label(&self) -> Option<&str> {
        match self {
            Concept::Thing { type_label, .. } => Some(type_label),
            Concept::Long(_) | Concept::Text(_) => None,
        }
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Concept::Thing { type_label, iid } => write!(f, "{}:{}", type_label, iid),
            Concept::Long(value) => write!(f, "{}", value),
            Concept::Text(value) => write!(f, "\"{}\"", value),
        }
    }
}

impl From<i64> for Concept {
    fn from(value: i64) -> Self {
        Concept::Long(value)
    }
}

impl From<&str> for Concept {
    fn from(value: &str) -> Self {
        Concept::Text(value.to_string())
    }
}

/// An assignment of query variables to concepts, compared by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ConceptMap(BTreeMap<String, Concept>);

impl ConceptMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, variable: &str) -> Option<&Concept> {
        self.0.get(variable)
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.0.contains_key(variable)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Concept)> {
        self.0.iter()
    }

    /// Binds `variable`, returning `false` if it is already bound to a different
    /// concept.
    pub fn bind(&mut self, variable: &str, concept: &Concept) -> bool {
        match self.0.get(variable) {
            Some(existing) => existing == concept,
            None => {
                self.0.insert(variable.to_string(), concept.clone());
                true
            }
        }
    }

    /// The union of both maps, or `None` if they disagree on a shared variable.
    pub fn merge(&self, other: &ConceptMap) -> Option<ConceptMap> {
        let mut merged = self.clone();
        for (variable, concept) in other.iter() {
            if !merged.bind(variable, concept) {
                return None;
            }
        }
        Some(merged)
    }
}

impl<S: Into<String>> FromIterator<(S, Concept)> for ConceptMap {
    fn from_iter<I: IntoIterator<Item = (S, Concept)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(variable, concept)| (variable.into(), concept))
                .collect(),
        )
    }
}

impl fmt::Display for ConceptMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (variable, concept)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "${}: {}", variable, concept)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, i64)]) -> ConceptMap {
        pairs.iter().map(|(v, c)| (*v, Concept::Long(*c))).collect()
    }

    #[test]
    fn test_merge_unions_compatible_bindings() {
        let merged = map(&[("x", 1)]).merge(&map(&[("x", 1), ("y", 10)]));
        assert_eq!(merged, Some(map(&[("x", 1), ("y", 10)])));
    }

    #[test]
    fn test_merge_rejects_conflicts() {
        assert_eq!(map(&[("x", 1)]).merge(&map(&[("x", 2)])), None);
    }

    #[test]
    fn test_value_equality_ignores_insertion_order() {
        let a: ConceptMap = vec![("y", Concept::Long(2)), ("x", Concept::Long(1))].into_iter().collect();
        assert_eq!(a, map(&[("x", 1), ("y", 2)]));
    }

    #[test]
    fn test_display() {
        let answer: ConceptMap = vec![
            ("p", Concept::thing("person", "alice")),
            ("n", Concept::from("Alice")),
        ]
        .into_iter()
        .collect();
        assert_eq!(answer.to_string(), "{$n: \"Alice\", $p: person:alice}");
    }
}
