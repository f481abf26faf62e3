// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for batch production and buffered aggregation.
//!
//! This module contains message types for logging events related to:
//! * Replenishing the buffer from the head producer
//! * Producers running dry or failing
//! * Recycling an aggregator and its producers

use crate::errors::ProducerError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// The aggregator asked its head producer for another batch.
///
/// # Log Level
/// `trace!` - Fires on every replenishment
pub struct BatchRequested<'a> {
    pub producer: &'a str,
    pub count: usize,
    pub buffered: usize,
    pub pending: usize,
}

impl Display for BatchRequested<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Requested {} items from '{}' (buffered={}, pending={})",
            self.count, self.producer, self.buffered, self.pending
        )
    }
}

impl StructuredLog for BatchRequested<'_> {
    fn log(&self) {
        tracing::trace!(
            producer = self.producer,
            count = self.count,
            buffered = self.buffered,
            pending = self.pending,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "batch_requested",
            span_name = name,
            producer = self.producer,
            count = self.count,
        )
    }
}

/// A producer signalled that it has nothing more to offer.
///
/// # Log Level
/// `debug!` - Normal lifecycle event
///
/// # Example
/// ```
/// use the_reasoner::observability::messages::producer::ProducerExhausted;
///
/// let msg = ProducerExhausted {
///     producer: "traversal",
///     remaining: 1,
/// };
///
/// assert_eq!(msg.to_string(), "Producer 'traversal' exhausted, 1 producers remaining");
/// ```
pub struct ProducerExhausted<'a> {
    pub producer: &'a str,
    pub remaining: usize,
}

impl Display for ProducerExhausted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Producer '{}' exhausted, {} producers remaining",
            self.producer, self.remaining
        )
    }
}

impl StructuredLog for ProducerExhausted<'_> {
    fn log(&self) {
        tracing::debug!(
            producer = self.producer,
            remaining = self.remaining,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "producer_exhausted",
            span_name = name,
            producer = self.producer,
            remaining = self.remaining,
        )
    }
}

/// A producer failed; the stream terminates with this error.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ProducerFailed<'a> {
    pub producer: &'a str,
    pub error: &'a ProducerError,
}

impl Display for ProducerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Producer '{}' failed: {}", self.producer, self.error)
    }
}

impl StructuredLog for ProducerFailed<'_> {
    fn log(&self) {
        tracing::error!(
            producer = self.producer,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "producer_failed",
            span_name = name,
            producer = self.producer,
            error = %self.error,
        )
    }
}

/// An aggregator released every producer it still referenced.
///
/// # Log Level
/// `debug!` - Normal lifecycle event
pub struct AggregatorRecycled {
    pub producers: usize,
}

impl Display for AggregatorRecycled {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Recycled aggregator holding {} producers", self.producers)
    }
}

impl StructuredLog for AggregatorRecycled {
    fn log(&self) {
        tracing::debug!(producers = self.producers, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "aggregator_recycled",
            span_name = name,
            producers = self.producers,
        )
    }
}
