// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pull-based, backpressure-controlled production.
//!
//! A [`Producer`](crate::traits::Producer) pushes bounded batches into a
//! [`Sink`](crate::traits::Sink) on the worker pool. A [`BufferedAggregator`]
//! chains producers in priority order behind one consumer-facing iterator and
//! keeps its buffer between a low and a high watermark.

pub mod base;
pub mod buffered;
#[cfg(test)]
mod integration_tests;

pub use base::BaseProducer;
pub use buffered::{BufferState, BufferedAggregator, Watermarks};
