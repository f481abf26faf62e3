// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for resolver actors and answer derivation.
//!
//! This module contains message types for logging events related to:
//! * Building and spawning the resolver network of a query
//! * Requests arriving at a resolver
//! * Answers produced and requests exhausted
//! * Resolver failures and recursion cut-offs

use crate::errors::ResolutionError;
use crate::observability::messages::StructuredLog;
use crate::resolution::concept::ConceptMap;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// The resolver network of a query has been spawned.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_reasoner::observability::messages::resolution::ResolversSpawned;
///
/// let msg = ResolversSpawned {
///     query: "ancestor($x, $y)",
///     resolver_count: 4,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ResolversSpawned<'a> {
    pub query: &'a str,
    pub resolver_count: usize,
}

impl Display for ResolversSpawned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Spawned {} resolvers for query {}",
            self.resolver_count, self.query
        )
    }
}

impl StructuredLog for ResolversSpawned<'_> {
    fn log(&self) {
        tracing::info!(
            query = self.query,
            resolver_count = self.resolver_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "resolution",
            span_name = name,
            query = self.query,
            resolver_count = self.resolver_count,
        )
    }
}

/// A request arrived in a resolver's mailbox.
///
/// # Log Level
/// `trace!` - Fires for every pull
pub struct RequestReceived<'a> {
    pub resolver: &'a str,
    pub request: u64,
    pub path_length: usize,
}

impl Display for RequestReceived<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}: received request {} (path length {})",
            self.resolver, self.request, self.path_length
        )
    }
}

impl StructuredLog for RequestReceived<'_> {
    fn log(&self) {
        tracing::trace!(
            resolver = self.resolver,
            request = self.request,
            path_length = self.path_length,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "request_received",
            span_name = name,
            resolver = self.resolver,
            request = self.request,
        )
    }
}

/// A resolver produced a new answer for one of its upstream requests.
///
/// # Log Level
/// `debug!` - Normal derivation event
pub struct AnswerProduced<'a> {
    pub resolver: &'a str,
    pub answer: &'a ConceptMap,
    pub inferred: bool,
}

impl Display for AnswerProduced<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let kind = if self.inferred { "inferred" } else { "stored" };
        write!(f, "{}: {} answer {}", self.resolver, kind, self.answer)
    }
}

impl StructuredLog for AnswerProduced<'_> {
    fn log(&self) {
        tracing::debug!(
            resolver = self.resolver,
            inferred = self.inferred,
            answer = %self.answer,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "answer_produced",
            span_name = name,
            resolver = self.resolver,
            inferred = self.inferred,
        )
    }
}

/// A resolver can produce no further answers for a request.
///
/// # Log Level
/// `debug!` - Normal lifecycle event
pub struct RequestExhausted<'a> {
    pub resolver: &'a str,
    pub request: u64,
    pub produced: usize,
}

impl Display for RequestExhausted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}: request {} exhausted after {} answers",
            self.resolver, self.request, self.produced
        )
    }
}

impl StructuredLog for RequestExhausted<'_> {
    fn log(&self) {
        tracing::debug!(
            resolver = self.resolver,
            request = self.request,
            produced = self.produced,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "request_exhausted",
            span_name = name,
            resolver = self.resolver,
            request = self.request,
        )
    }
}

/// A resolver failed; the whole query is cancelled.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ResolverFailed<'a> {
    pub resolver: &'a str,
    pub error: &'a ResolutionError,
}

impl Display for ResolverFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Resolver '{}' failed: {}", self.resolver, self.error)
    }
}

impl StructuredLog for ResolverFailed<'_> {
    fn log(&self) {
        tracing::error!(
            resolver = self.resolver,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "resolver_failed",
            span_name = name,
            resolver = self.resolver,
            error = %self.error,
        )
    }
}

/// A concludable stopped expanding a rule because the request path is too long.
///
/// # Log Level
/// `debug!` - Expected with recursive rules
pub struct RuleExpansionCut<'a> {
    pub resolver: &'a str,
    pub rule: &'a str,
    pub path_length: usize,
}

impl Display for RuleExpansionCut<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}: not expanding rule '{}' at path length {}",
            self.resolver, self.rule, self.path_length
        )
    }
}

impl StructuredLog for RuleExpansionCut<'_> {
    fn log(&self) {
        tracing::debug!(
            resolver = self.resolver,
            rule = self.rule,
            path_length = self.path_length,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "rule_expansion_cut",
            span_name = name,
            resolver = self.resolver,
            rule = self.rule,
        )
    }
}
