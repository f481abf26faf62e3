// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Answers and their provenance.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::resolution::concept::ConceptMap;
use crate::resolution::message::ResolverId;

/// Which resolver supplied which sub-answer.
///
/// Append-only: [`Derivation::with_answer`] returns a new derivation and leaves
/// the receiver untouched. Clones share the underlying map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Derivation {
    answers: Arc<BTreeMap<ResolverId, Answer>>,
}

impl Derivation {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn answers(&self) -> &BTreeMap<ResolverId, Answer> {
        &self.answers
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// # Panics
    ///
    /// If `resolver` already contributed to this derivation. Resolvers only add
    /// entries for their own open downstream requests, so a second entry means
    /// the plan handed to resolution was broken.
    pub fn with_answer(&self, resolver: ResolverId, answer: Answer) -> Self {
        assert!(
            !self.answers.contains_key(&resolver),
            "derivation already holds an answer from resolver {}",
            resolver
        );
        let mut answers = (*self.answers).clone();
        answers.insert(resolver, answer);
        Self {
            answers: Arc::new(answers),
        }
    }
}

impl Serialize for Derivation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.answers.len()))?;
        for (resolver, answer) in self.answers.iter() {
            map.serialize_entry(resolver, answer)?;
        }
        map.end()
    }
}

/// A binding that satisfies a pattern, with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Answer {
    concept_map: ConceptMap,
    pattern: String,
    #[serde(skip_serializing_if = "Derivation::is_empty")]
    derivation: Derivation,
    producer: ResolverId,
}

impl Answer {
    pub fn new(concept_map: ConceptMap, pattern: impl Into<String>, derivation: Derivation, producer: ResolverId) -> Self {
        Self {
            concept_map,
            pattern: pattern.into(),
            derivation,
            producer,
        }
    }

    pub fn concept_map(&self) -> &ConceptMap {
        &self.concept_map
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn derivation(&self) -> &Derivation {
        &self.derivation
    }

    pub fn producer(&self) -> ResolverId {
        self.producer
    }

    /// Inferred answers depend on at least one rule somewhere below them.
    pub fn is_inferred(&self) -> bool {
        !self.derivation.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::concept::Concept;

    fn answer(x: i64, producer: usize) -> Answer {
        let binding: ConceptMap = vec![("x", Concept::Long(x))].into_iter().collect();
        Answer::new(binding, "p($x)", Derivation::empty(), ResolverId::new(producer))
    }

    #[test]
    fn test_with_answer_adds_exactly_one_entry() {
        let sub = answer(1, 3);
        let derivation = Derivation::empty().with_answer(ResolverId::new(3), sub.clone());

        assert_eq!(derivation.answers().len(), 1);
        assert_eq!(derivation.answers().get(&ResolverId::new(3)), Some(&sub));
        assert!(Derivation::empty().is_empty());
    }

    #[test]
    fn test_with_answer_leaves_original_untouched() {
        let first = Derivation::empty().with_answer(ResolverId::new(1), answer(1, 1));
        let second = first.with_answer(ResolverId::new(2), answer(2, 2));

        assert_eq!(first.answers().len(), 1);
        assert_eq!(second.answers().len(), 2);
        assert!(second.answers().contains_key(&ResolverId::new(1)));
    }

    #[test]
    #[should_panic(expected = "derivation already holds an answer")]
    fn test_with_answer_refuses_overwrite() {
        let derivation = Derivation::empty().with_answer(ResolverId::new(1), answer(1, 1));
        let _ = derivation.with_answer(ResolverId::new(1), answer(2, 1));
    }

    #[test]
    fn test_inferred_iff_derivation_non_empty() {
        let plain = answer(1, 0);
        assert!(!plain.is_inferred());

        let inferred = Answer::new(
            plain.concept_map().clone(),
            "q($x)",
            Derivation::empty().with_answer(ResolverId::new(4), plain.clone()),
            ResolverId::new(0),
        );
        assert!(inferred.is_inferred());
    }
}
