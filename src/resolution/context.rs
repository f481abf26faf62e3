// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tokio::runtime::Handle;

use crate::errors::ResolutionError;
use crate::producer::{BaseProducer, BufferedAggregator, Watermarks};
use crate::resolution::concept::ConceptMap;
use crate::resolution::pattern::Atom;
use crate::traits::{Producer, Traversal};

/// Collaborators and limits shared by every resolver of a query.
pub struct ResolutionContext {
    traversal: Arc<dyn Traversal>,
    worker_pool: Handle,
    buffer: Watermarks,
    max_path_length: usize,
}

impl ResolutionContext {
    pub fn new(traversal: Arc<dyn Traversal>, worker_pool: Handle, buffer: Watermarks, max_path_length: usize) -> Self {
        Self {
            traversal,
            worker_pool,
            buffer,
            max_path_length,
        }
    }

    pub fn max_path_length(&self) -> usize {
        self.max_path_length
    }

    /// Opens a buffered traversal of `atoms` under `bounds`, drained on the
    /// worker pool.
    pub fn traverse(
        &self,
        name: &str,
        atoms: &[Atom],
        bounds: &ConceptMap,
    ) -> Result<BufferedAggregator<ConceptMap>, ResolutionError> {
        let cursor = self.traversal.traverse(atoms, bounds)?;
        let producer: Arc<dyn Producer<ConceptMap>> =
            Arc::new(BaseProducer::new(name, cursor, self.worker_pool.clone()));
        Ok(BufferedAggregator::new(vec![producer], self.buffer))
    }
}
