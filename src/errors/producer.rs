// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The single failure type carried by a terminal `Done` signal.

use thiserror::Error;

/// Failure that terminates a produced stream.
///
/// Every consumer-facing iterator surfaces at most one of these, at the point the
/// stream stopped. Items delivered before it remain valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProducerError {
    /// Pulling the next item from a storage cursor failed.
    #[error("traversal failed: {message}")]
    Traversal { message: String },

    /// The blocking hand-off between producers and the consumer was cut short.
    #[error("stream interrupted: {reason}")]
    Interrupted { reason: String },

    /// A resolver failed while deriving answers.
    #[error("resolution failed in {resolver}: {message}")]
    Resolution { resolver: String, message: String },
}

impl ProducerError {
    pub fn traversal(message: impl Into<String>) -> Self {
        ProducerError::Traversal {
            message: message.into(),
        }
    }

    pub fn interrupted(reason: impl Into<String>) -> Self {
        ProducerError::Interrupted {
            reason: reason.into(),
        }
    }
}
