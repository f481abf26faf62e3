// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProducerError;
use crate::resolution::concept::ConceptMap;
use crate::resolution::pattern::Atom;
use crate::traits::{Traversal, TraversalSource};

/// A cursor over a fixed list of items that counts how often it is recycled
pub struct VecSource<T> {
    items: VecDeque<T>,
    recycled: Option<Arc<AtomicUsize>>,
}

impl<T> VecSource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
            recycled: None,
        }
    }

    pub fn with_recycle_counter(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.recycled = Some(counter);
        self
    }
}

impl<T> Iterator for VecSource<T> {
    type Item = Result<T, ProducerError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.pop_front().map(Ok)
    }
}

impl<T: Send> TraversalSource<T> for VecSource<T> {
    fn recycle(&mut self) {
        self.items.clear();
        if let Some(counter) = &self.recycled {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// A cursor that yields its items and then fails
pub struct FailingSource<T> {
    items: VecDeque<T>,
    message: String,
    failed: bool,
}

impl<T> FailingSource<T> {
    pub fn new(items: Vec<T>, message: impl Into<String>) -> Self {
        Self {
            items: items.into(),
            message: message.into(),
            failed: false,
        }
    }
}

impl<T> Iterator for FailingSource<T> {
    type Item = Result<T, ProducerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.items.pop_front() {
            return Some(Ok(item));
        }
        if self.failed {
            return None;
        }
        self.failed = true;
        Some(Err(ProducerError::traversal(self.message.clone())))
    }
}

impl<T: Send> TraversalSource<T> for FailingSource<T> {
    fn recycle(&mut self) {
        self.items.clear();
        self.failed = true;
    }
}

/// A cursor that yields its items and then panics, as a corrupted storage
/// cursor would
pub struct PanickingSource<T> {
    items: VecDeque<T>,
    recycled: Arc<AtomicUsize>,
}

impl<T> PanickingSource<T> {
    pub fn new(items: Vec<T>, recycled: Arc<AtomicUsize>) -> Self {
        Self {
            items: items.into(),
            recycled,
        }
    }
}

impl<T> Iterator for PanickingSource<T> {
    type Item = Result<T, ProducerError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.items.pop_front() {
            Some(item) => Some(Ok(item)),
            None => panic!("cursor corrupted"),
        }
    }
}

impl<T: Send> TraversalSource<T> for PanickingSource<T> {
    fn recycle(&mut self) {
        self.items.clear();
        self.recycled.fetch_add(1, Ordering::SeqCst);
    }
}

/// A traversal collaborator whose cursors always fail
pub struct FailingTraversal {
    pub message: String,
}

impl FailingTraversal {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Traversal for FailingTraversal {
    fn traverse(
        &self,
        _atoms: &[Atom],
        _bounds: &ConceptMap,
    ) -> Result<Box<dyn TraversalSource<ConceptMap>>, ProducerError> {
        Ok(Box::new(FailingSource::new(Vec::new(), self.message.clone())))
    }
}
