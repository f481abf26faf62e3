// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod producer;
pub mod recorder;
pub mod resolver;
pub mod traversal;

pub use producer::{Producer, Sink};
pub use recorder::ExplanationRecorder;
pub use resolver::Resolver;
pub use traversal::{Traversal, TraversalSource};
