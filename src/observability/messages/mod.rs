// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit the same event with structured fields at the level
//! documented on the type.
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_reasoner::observability::messages::StructuredLog;
//! use the_reasoner::observability::messages::resolution::ResolversSpawned;
//!
//! let msg = ResolversSpawned {
//!     query: "ancestor($x, $y)",
//!     resolver_count: 5,
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod producer;
pub mod resolution;

/// Emits a message as a structured `tracing` event, or opens a span for it.
pub trait StructuredLog {
    fn log(&self);

    fn span(&self, name: &str) -> Span;
}
