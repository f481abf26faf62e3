// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sub-patterns, conjunctions and rules as handed over by the planner.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::errors::ResolutionError;
use crate::resolution::concept::{Concept, ConceptMap};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Var(String),
    Const(Concept),
}

impl Term {
    pub fn var(name: impl Into<String>) -> Self {
        Term::Var(name.into())
    }

    pub fn constant(concept: impl Into<Concept>) -> Self {
        Term::Const(concept.into())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Var(name) => write!(f, "${}", name),
            Term::Const(concept) => write!(f, "{}", concept),
        }
    }
}

/// One sub-pattern: a relation over terms, with the candidate types the type
/// resolver found for its variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    relation: String,
    args: Vec<Term>,
    type_hints: BTreeMap<String, BTreeSet<String>>,
}

impl Atom {
    pub fn new(relation: impl Into<String>, args: Vec<Term>) -> Self {
        Self {
            relation: relation.into(),
            args,
            type_hints: BTreeMap::new(),
        }
    }

    /// Restricts `variable` to things of the given type (hints accumulate).
    pub fn with_type_hint(mut self, variable: impl Into<String>, type_label: impl Into<String>) -> Self {
        self.type_hints
            .entry(variable.into())
            .or_default()
            .insert(type_label.into());
        self
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn args(&self) -> &[Term] {
        &self.args
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn variables(&self) -> BTreeSet<&str> {
        self.args
            .iter()
            .filter_map(|term| match term {
                Term::Var(name) => Some(name.as_str()),
                Term::Const(_) => None,
            })
            .collect()
    }

    /// Whether `concept` satisfies the type hints of `variable`.
    pub fn admits(&self, variable: &str, concept: &Concept) -> bool {
        match self.type_hints.get(variable) {
            None => true,
            Some(labels) => concept
                .type_label()
                .is_some_and(|label| labels.contains(label)),
        }
    }

    pub fn admits_all(&self, binding: &ConceptMap) -> bool {
        binding
            .iter()
            .all(|(variable, concept)| self.admits(variable, concept))
    }

    /// Extends `bounds` with the bindings that make this atom match a stored
    /// fact, or `None` if the fact does not match.
    pub fn match_fact(&self, relation: &str, values: &[Concept], bounds: &ConceptMap) -> Option<ConceptMap> {
        if relation != self.relation || values.len() != self.args.len() {
            return None;
        }
        let mut binding = bounds.clone();
        for (term, value) in self.args.iter().zip(values) {
            match term {
                Term::Const(concept) if concept != value => return None,
                Term::Const(_) => {}
                Term::Var(name) => {
                    if !self.admits(name, value) || !binding.bind(name, value) {
                        return None;
                    }
                }
            }
        }
        Some(binding)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.relation)?;
        for (i, term) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", term)?;
        }
        write!(f, ")")
    }
}

/// An ordered plan of sub-patterns. The order is authoritative; resolution
/// never reorders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conjunction {
    atoms: Vec<Atom>,
}

impl Conjunction {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn variables(&self) -> BTreeSet<&str> {
        self.atoms.iter().flat_map(|atom| atom.variables()).collect()
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, atom) in self.atoms.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", atom)?;
        }
        Ok(())
    }
}

/// `when` holds, therefore `then` holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    label: String,
    when: Conjunction,
    then: Atom,
}

impl Rule {
    pub fn new(label: impl Into<String>, when: Conjunction, then: Atom) -> Result<Self, ResolutionError> {
        let label = label.into();
        if when.is_empty() {
            return Err(ResolutionError::InvalidRule {
                rule: label,
                reason: "condition is empty".to_string(),
            });
        }
        let bound = when.variables();
        if let Some(unbound) = then.variables().into_iter().find(|v| !bound.contains(v)) {
            return Err(ResolutionError::InvalidRule {
                reason: format!("conclusion variable ${} does not occur in the condition", unbound),
                rule: label,
            });
        }
        Ok(Self { label, when, then })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn when(&self) -> &Conjunction {
        &self.when
    }

    pub fn then(&self) -> &Atom {
        &self.then
    }

    /// Whether this rule can conclude facts of the shape of `atom`.
    pub fn concludes(&self, atom: &Atom) -> bool {
        self.then.relation() == atom.relation() && self.then.arity() == atom.arity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent(a: Term, b: Term) -> Atom {
        Atom::new("parent", vec![a, b])
    }

    #[test]
    fn test_match_fact_binds_and_checks() {
        let atom = parent(Term::var("x"), Term::var("y"));
        let values = [Concept::thing("person", "ann"), Concept::thing("person", "bob")];

        let binding = atom.match_fact("parent", &values, &ConceptMap::new()).unwrap();
        assert_eq!(binding.get("x"), Some(&Concept::thing("person", "ann")));

        let bound: ConceptMap = vec![("x", Concept::thing("person", "bob"))].into_iter().collect();
        assert_eq!(atom.match_fact("parent", &values, &bound), None);
        assert_eq!(atom.match_fact("sibling", &values, &ConceptMap::new()), None);
    }

    #[test]
    fn test_repeated_variable_must_agree() {
        let atom = parent(Term::var("x"), Term::var("x"));
        let values = [Concept::Long(1), Concept::Long(2)];
        assert_eq!(atom.match_fact("parent", &values, &ConceptMap::new()), None);
    }

    #[test]
    fn test_type_hints_filter_things() {
        let atom = parent(Term::var("x"), Term::var("y")).with_type_hint("x", "person");
        let dog = [Concept::thing("dog", "rex"), Concept::thing("dog", "pup")];
        let person = [Concept::thing("person", "ann"), Concept::thing("dog", "pup")];

        assert_eq!(atom.match_fact("parent", &dog, &ConceptMap::new()), None);
        assert!(atom.match_fact("parent", &person, &ConceptMap::new()).is_some());
    }

    #[test]
    fn test_rule_requires_grounded_conclusion() {
        let when = Conjunction::new(vec![parent(Term::var("x"), Term::var("y"))]);
        let ok = Rule::new("r", when.clone(), Atom::new("ancestor", vec![Term::var("x"), Term::var("y")]));
        assert!(ok.is_ok());

        let bad = Rule::new("r", when, Atom::new("ancestor", vec![Term::var("x"), Term::var("z")]));
        assert!(matches!(bad, Err(ResolutionError::InvalidRule { .. })));
    }

    #[test]
    fn test_display() {
        let atom = parent(Term::var("x"), Term::constant(3i64));
        assert_eq!(atom.to_string(), "parent($x, 3)");
    }
}
