// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Resolver variants.
//!
//! - [`RootResolver`]: the query itself; hands answers to the caller.
//! - [`ConjunctionResolver`]: the condition of one rule.
//! - [`ConcludableResolver`]: one sub-pattern, answered from stored facts and
//!   from every rule that can conclude it.

pub mod concludable;
pub mod conjunction;
pub mod plan;
pub mod root;

pub use concludable::ConcludableResolver;
pub use conjunction::ConjunctionResolver;
pub use plan::{ConjunctionPlan, Step};
pub use root::{RootOutcome, RootResolver};
