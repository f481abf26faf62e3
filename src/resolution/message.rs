// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Messages exchanged between resolver actors.

use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::resolution::answer::{Answer, Derivation};
use crate::resolution::concept::ConceptMap;
use crate::resolution::unifier::Unifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ResolverId(usize);

impl ResolverId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ResolverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(0);

impl RequestId {
    fn next() -> Self {
        Self(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Resolvers a request travelled through, from the root to its receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionPath(Vec<ResolverId>);

impl ResolutionPath {
    pub fn root(resolver: ResolverId) -> Self {
        Self(vec![resolver])
    }

    pub fn append(&self, resolver: ResolverId) -> Self {
        let mut path = self.0.clone();
        path.push(resolver);
        Self(path)
    }

    pub fn receiver(&self) -> ResolverId {
        self.0[self.0.len() - 1]
    }

    /// `None` for a request that entered resolution from outside.
    pub fn sender(&self) -> Option<ResolverId> {
        self.0.len().checked_sub(2).map(|i| self.0[i])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, resolver: ResolverId) -> bool {
        self.0.contains(&resolver)
    }
}

/// A pull for the next answer, carrying the binding and provenance so far.
///
/// Identity is the request id: re-sending a clone of a request pulls again from
/// the same response producer downstream.
#[derive(Debug, Clone)]
pub struct Request {
    id: RequestId,
    path: ResolutionPath,
    partial: ConceptMap,
    unifier: Unifier,
    derivation: Derivation,
}

impl Request {
    pub fn new(path: ResolutionPath, partial: ConceptMap, unifier: Unifier, derivation: Derivation) -> Self {
        Self {
            id: RequestId::next(),
            path,
            partial,
            unifier,
            derivation,
        }
    }

    pub fn root(resolver: ResolverId) -> Self {
        Self::new(
            ResolutionPath::root(resolver),
            ConceptMap::new(),
            Unifier::identity(),
            Derivation::empty(),
        )
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn path(&self) -> &ResolutionPath {
        &self.path
    }

    pub fn partial(&self) -> &ConceptMap {
        &self.partial
    }

    pub fn unifier(&self) -> &Unifier {
        &self.unifier
    }

    pub fn derivation(&self) -> &Derivation {
        &self.derivation
    }
}

impl PartialEq for Request {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Request {}

impl Hash for Request {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug, Clone)]
pub enum Response {
    Answer { answer: Answer, source_request: Request },
    Exhausted { source_request: Request },
    /// The root delivered an answer to the caller; nothing travels further.
    RootResponse { source_request: Request },
}

impl Response {
    pub fn source_request(&self) -> &Request {
        match self {
            Response::Answer { source_request, .. }
            | Response::Exhausted { source_request }
            | Response::RootResponse { source_request } => source_request,
        }
    }
}

/// The single message a resolver hook asks its actor to send.
#[derive(Debug, Clone)]
pub enum Outgoing {
    Request(Request),
    Response(Response),
}

/// Mailbox payload of a resolver actor.
#[derive(Debug)]
pub enum ResolverMessage {
    Request(Request),
    Response(Response),
}
