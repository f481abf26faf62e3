// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ProducerError;
use crate::resolution::concept::ConceptMap;
use crate::resolution::pattern::Atom;

/// A storage cursor: a finite, lazy sequence of results that holds resources
/// until recycled.
pub trait TraversalSource<T>: Iterator<Item = Result<T, ProducerError>> + Send {
    /// Frees the cursor. Idempotent; the source yields nothing afterwards.
    fn recycle(&mut self);
}

/// The storage/traversal collaborator.
pub trait Traversal: Send + Sync {
    /// Opens a cursor over every binding that satisfies all `atoms` and agrees
    /// with `bounds`. Yielded bindings include `bounds`.
    fn traverse(
        &self,
        atoms: &[Atom],
        bounds: &ConceptMap,
    ) -> Result<Box<dyn TraversalSource<ConceptMap>>, ProducerError>;
}
