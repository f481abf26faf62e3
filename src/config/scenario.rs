// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Self-contained reasoning scenarios: facts, rules, a query and the config to
//! run it with.
//!
//! Patterns are written as single-entry maps from relation to arguments.
//! Arguments starting with `$` are variables, `type:iid` strings are things,
//! integers are longs and any other string is a text value.
//!
//! ```yaml
//! facts:
//!   - parent: [person:ann, person:bob]
//! rules:
//!   - label: ancestor-base
//!     when:
//!       - parent: [$x, $y]
//!     then:
//!       ancestor: [$x, $y]
//! query:
//!   - ancestor: [$a, $b]
//! types:
//!   a: [person]
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::backends::{Fact, MemoryGraph};
use crate::config::loader::read_file;
use crate::config::validation::validate_config;
use crate::config::Config;
use crate::errors::ConfigError;
use crate::resolution::{Atom, Concept, Conjunction, Rule, Term};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum RawTerm {
    Long(i64),
    Text(String),
}

type RawPattern = BTreeMap<String, Vec<RawTerm>>;

#[derive(Debug, Clone, Deserialize)]
struct RawRule {
    label: String,
    when: Vec<RawPattern>,
    then: RawPattern,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: Config,
    #[serde(default)]
    facts: Vec<RawPattern>,
    #[serde(default)]
    rules: Vec<RawRule>,
    query: Vec<RawPattern>,
    /// variable -> candidate type labels, applied to every query pattern
    #[serde(default)]
    types: BTreeMap<String, Vec<String>>,
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidScenario(message.into())
}

fn parse_term(raw: &RawTerm) -> Result<Term, ConfigError> {
    match raw {
        RawTerm::Long(value) => Ok(Term::Const(Concept::Long(*value))),
        RawTerm::Text(text) => {
            if let Some(variable) = text.strip_prefix('$') {
                if variable.is_empty() {
                    return Err(invalid("variable without a name"));
                }
                return Ok(Term::var(variable));
            }
            Ok(Term::Const(match text.split_once(':') {
                Some((type_label, iid)) if !type_label.is_empty() && !iid.is_empty() => {
                    Concept::thing(type_label, iid)
                }
                _ => Concept::Text(text.clone()),
            }))
        }
    }
}

fn parse_pattern(raw: &RawPattern) -> Result<Atom, ConfigError> {
    let mut entries = raw.iter();
    let (Some((relation, args)), None) = (entries.next(), entries.next()) else {
        return Err(invalid(format!(
            "a pattern maps exactly one relation to its arguments, got {} entries",
            raw.len()
        )));
    };
    let args = args.iter().map(parse_term).collect::<Result<Vec<_>, _>>()?;
    Ok(Atom::new(relation.clone(), args))
}

impl Scenario {
    pub fn facts(&self) -> Result<Vec<Fact>, ConfigError> {
        self.facts
            .iter()
            .map(|raw| {
                let atom = parse_pattern(raw)?;
                let args = atom
                    .args()
                    .iter()
                    .map(|term| match term {
                        Term::Const(concept) => Ok(concept.clone()),
                        Term::Var(name) => Err(invalid(format!("fact {} has variable ${}", atom, name))),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Fact::new(atom.relation(), args))
            })
            .collect()
    }

    pub fn graph(&self) -> Result<MemoryGraph, ConfigError> {
        Ok(MemoryGraph::from_facts(self.facts()?))
    }

    pub fn rules(&self) -> Result<Vec<Rule>, ConfigError> {
        self.rules
            .iter()
            .map(|raw| {
                let when = raw.when.iter().map(parse_pattern).collect::<Result<Vec<_>, _>>()?;
                let then = parse_pattern(&raw.then)?;
                Ok(Rule::new(raw.label.clone(), Conjunction::new(when), then)?)
            })
            .collect()
    }

    pub fn query(&self) -> Result<Conjunction, ConfigError> {
        let atoms = self
            .query
            .iter()
            .map(|raw| {
                let mut atom = parse_pattern(raw)?;
                let variables: Vec<String> = atom.variables().into_iter().map(str::to_string).collect();
                for variable in variables {
                    for type_label in self.types.get(&variable).into_iter().flatten() {
                        atom = atom.with_type_hint(variable.as_str(), type_label.as_str());
                    }
                }
                Ok(atom)
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        if atoms.is_empty() {
            return Err(invalid("query has no patterns"));
        }
        Ok(Conjunction::new(atoms))
    }
}

/// Loads a scenario and checks that its config, facts, rules and query parse.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<Scenario, ConfigError> {
    let content = read_file(path.as_ref())?;
    let scenario: Scenario = serde_yaml::from_str(&content)?;
    validate_config(&scenario.config)?;
    scenario.facts()?;
    scenario.rules()?;
    scenario.query()?;
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> RawTerm {
        RawTerm::Text(value.to_string())
    }

    #[test]
    fn test_term_syntax() {
        assert_eq!(parse_term(&text("$x")).unwrap(), Term::var("x"));
        assert_eq!(
            parse_term(&text("person:ann")).unwrap(),
            Term::Const(Concept::thing("person", "ann"))
        );
        assert_eq!(parse_term(&RawTerm::Long(7)).unwrap(), Term::Const(Concept::Long(7)));
        assert_eq!(
            parse_term(&text("plain")).unwrap(),
            Term::Const(Concept::Text("plain".to_string()))
        );
        assert!(parse_term(&text("$")).is_err());
    }

    #[test]
    fn test_pattern_needs_single_relation() {
        let two: RawPattern = serde_yaml::from_str("{a: [$x], b: [$y]}").unwrap();
        assert!(matches!(parse_pattern(&two), Err(ConfigError::InvalidScenario(_))));
    }

    #[test]
    fn test_facts_must_be_ground() {
        let scenario: Scenario = serde_yaml::from_str("facts:\n  - p: [$x]\nquery:\n  - p: [$x]").unwrap();
        assert!(scenario.facts().is_err());
    }

    #[test]
    fn test_types_become_hints() {
        let scenario: Scenario =
            serde_yaml::from_str("query:\n  - owns: [$who, $pet]\ntypes:\n  who: [person]").unwrap();
        let query = scenario.query().unwrap();
        let atom = &query.atoms()[0];

        assert!(atom.admits("who", &Concept::thing("person", "ann")));
        assert!(!atom.admits("who", &Concept::thing("dog", "rex")));
        assert!(atom.admits("pet", &Concept::thing("dog", "rex")));
    }
}
