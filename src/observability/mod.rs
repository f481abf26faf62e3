// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for diagnostic and operational
//! logging throughout the reasoner. Message types follow a struct-based pattern
//! with `Display` trait implementation to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Keep the structured fields of an event next to its human-readable text
//! * Provide consistent, structured logging output
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::producer` - batch production and buffered aggregation events
//! * `messages::resolution` - resolver actor and answer derivation events
//!
//! # Usage
//!
//! ```rust
//! use the_reasoner::observability::messages::producer::ProducerFailed;
//! use the_reasoner::errors::ProducerError;
//!
//! let error = ProducerError::traversal("cursor closed");
//! let msg = ProducerFailed {
//!     producer: "traversal",
//!     error: &error,
//! };
//!
//! tracing::error!("{}", msg);
//! ```

pub mod messages;
