// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while building or running resolvers.

use crate::errors::ProducerError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// A message was addressed to a resolver that was never registered.
    #[error("no resolver registered with id {0}")]
    UnknownResolver(usize),

    /// The resolver's actor has already stopped.
    #[error("mailbox of resolver '{resolver}' is closed")]
    MailboxClosed { resolver: String },

    /// A response arrived for a request this resolver has no record of.
    #[error("resolver '{resolver}' received a response for unknown request {request}")]
    UnknownRequest { resolver: String, request: u64 },

    /// A rule whose conclusion cannot be grounded by its condition.
    #[error("invalid rule '{rule}': {reason}")]
    InvalidRule { rule: String, reason: String },

    /// The local traversal of a resolver failed.
    #[error(transparent)]
    Producer(#[from] ProducerError),
}

impl ResolutionError {
    /// Converts into the failure surfaced on the answer stream, tagging it with
    /// the resolver it came from unless it already is a stream failure.
    pub fn into_producer_error(self, resolver: &str) -> ProducerError {
        match self {
            ResolutionError::Producer(error) => error,
            other => ProducerError::Resolution {
                resolver: resolver.to_string(),
                message: other.to_string(),
            },
        }
    }
}
