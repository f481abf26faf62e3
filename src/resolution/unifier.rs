// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::resolution::concept::{Concept, ConceptMap};
use crate::resolution::pattern::{Atom, Term};

/// Maps a concludable atom onto a rule conclusion and back.
///
/// Carried on the request sent to the rule, so that the rule's answers can be
/// translated into the variables of the atom that asked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Unifier {
    /// (rule variable, atom variable)
    variables: Vec<(String, String)>,
    /// atom variables fixed by a constant in the conclusion
    constants: Vec<(String, Concept)>,
}

impl Unifier {
    pub fn identity() -> Self {
        Self::default()
    }

    /// Unifies `atom` (with the upstream `bounds`) against a rule conclusion.
    /// Returns the bindings the rule starts from, in rule variables.
    pub fn unify(atom: &Atom, conclusion: &Atom, bounds: &ConceptMap) -> Option<(ConceptMap, Unifier)> {
        if atom.relation() != conclusion.relation() || atom.arity() != conclusion.arity() {
            return None;
        }
        let mut rule_bounds = ConceptMap::new();
        let mut unifier = Unifier::default();

        for (asked, concluded) in atom.args().iter().zip(conclusion.args()) {
            match (asked, concluded) {
                (Term::Var(atom_var), Term::Var(rule_var)) => {
                    if let Some(value) = bounds.get(atom_var) {
                        if !rule_bounds.bind(rule_var, value) {
                            return None;
                        }
                    }
                    unifier.variables.push((rule_var.clone(), atom_var.clone()));
                }
                (Term::Const(value), Term::Var(rule_var)) => {
                    if !rule_bounds.bind(rule_var, value) {
                        return None;
                    }
                }
                (Term::Var(atom_var), Term::Const(value)) => {
                    if bounds.get(atom_var).is_some_and(|bound| bound != value) {
                        return None;
                    }
                    unifier.constants.push((atom_var.clone(), value.clone()));
                }
                (Term::Const(asked), Term::Const(concluded)) => {
                    if asked != concluded {
                        return None;
                    }
                }
            }
        }
        Some((rule_bounds, unifier))
    }

    /// Translates a rule answer into the atom's variables on top of `upstream`.
    /// `None` if the translation contradicts itself or `upstream`.
    pub fn unify_answer(&self, rule_answer: &ConceptMap, upstream: &ConceptMap) -> Option<ConceptMap> {
        let mut answer = upstream.clone();
        for (rule_var, atom_var) in &self.variables {
            let value = rule_answer.get(rule_var)?;
            if !answer.bind(atom_var, value) {
                return None;
            }
        }
        for (atom_var, value) in &self.constants {
            if !answer.bind(atom_var, value) {
                return None;
            }
        }
        Some(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long(v: i64) -> Concept {
        Concept::Long(v)
    }

    #[test]
    fn test_unify_carries_bound_values_into_rule_space() {
        let atom = Atom::new("ancestor", vec![Term::var("a"), Term::var("b")]);
        let conclusion = Atom::new("ancestor", vec![Term::var("x"), Term::var("y")]);
        let bounds: ConceptMap = vec![("a", long(1))].into_iter().collect();

        let (rule_bounds, unifier) = Unifier::unify(&atom, &conclusion, &bounds).unwrap();
        assert_eq!(rule_bounds, vec![("x", long(1))].into_iter().collect());

        let rule_answer: ConceptMap = vec![("x", long(1)), ("y", long(2)), ("z", long(9))].into_iter().collect();
        let answer = unifier.unify_answer(&rule_answer, &bounds).unwrap();
        assert_eq!(answer, vec![("a", long(1)), ("b", long(2))].into_iter().collect());
    }

    #[test]
    fn test_unify_rejects_constant_clash() {
        let atom = Atom::new("age", vec![Term::var("p"), Term::constant(30i64)]);
        let conclusion = Atom::new("age", vec![Term::var("q"), Term::constant(40i64)]);
        assert!(Unifier::unify(&atom, &conclusion, &ConceptMap::new()).is_none());
    }

    #[test]
    fn test_conclusion_constant_binds_atom_variable() {
        let atom = Atom::new("age", vec![Term::var("p"), Term::var("n")]);
        let conclusion = Atom::new("age", vec![Term::var("q"), Term::constant(40i64)]);
        let (_, unifier) = Unifier::unify(&atom, &conclusion, &ConceptMap::new()).unwrap();

        let rule_answer: ConceptMap = vec![("q", long(7))].into_iter().collect();
        let answer = unifier.unify_answer(&rule_answer, &ConceptMap::new()).unwrap();
        assert_eq!(answer, vec![("p", long(7)), ("n", long(40))].into_iter().collect());
    }

    #[test]
    fn test_repeated_conclusion_variable_must_agree() {
        let atom = Atom::new("same", vec![Term::var("a"), Term::var("b")]);
        let conclusion = Atom::new("same", vec![Term::var("x"), Term::var("x")]);
        let bounds: ConceptMap = vec![("a", long(1)), ("b", long(2))].into_iter().collect();
        assert!(Unifier::unify(&atom, &conclusion, &bounds).is_none());
    }
}
