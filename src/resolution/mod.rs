// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Actor-based answer resolution.
//!
//! A query is resolved by a network of resolvers, one task each, that pull
//! answers from each other with [`message::Request`]s and reply with
//! [`message::Response`]s. Every pull produces exactly one reply, possibly after
//! a chain of further pulls downstream:
//!
//! ```text
//! caller -> Root -> Concludable(a1) -> ... -> Concludable(an)
//!                        |
//!                        +-> Conjunction(rule body) -> Concludable(b1) -> ...
//! ```
//!
//! Each resolver keeps one [`response_producer::ResponseProducer`] per open
//! upstream request. Answers bubble back up, merging bindings and recording in a
//! [`answer::Derivation`] which resolver supplied which sub-answer.

pub mod actor;
pub mod answer;
pub mod concept;
pub mod context;
pub mod message;
pub mod pattern;
pub mod reasoner;
pub mod recorder;
pub mod resolver;
pub mod response_producer;
pub mod unifier;


pub use answer::{Answer, Derivation};
pub use concept::{Concept, ConceptMap};
pub use pattern::{Atom, Conjunction, Rule, Term};
pub use reasoner::Reasoner;
pub use recorder::ResolutionRecorder;
pub use unifier::Unifier;
