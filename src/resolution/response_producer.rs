// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{HashSet, VecDeque};

use crate::errors::ProducerError;
use crate::producer::BufferedAggregator;
use crate::resolution::concept::ConceptMap;
use crate::resolution::message::Request;

/// Per-request state of one resolver.
///
/// Holds the local traversal (if any), the downstream requests still open for
/// this upstream request, and every binding already sent upstream for it.
pub struct ResponseProducer {
    traversal: Option<BufferedAggregator<ConceptMap>>,
    downstreams: VecDeque<Request>,
    produced: HashSet<ConceptMap>,
}

impl ResponseProducer {
    pub fn new(traversal: Option<BufferedAggregator<ConceptMap>>) -> Self {
        Self {
            traversal,
            downstreams: VecDeque::new(),
            produced: HashSet::new(),
        }
    }

    pub fn has_produced(&self, binding: &ConceptMap) -> bool {
        self.produced.contains(binding)
    }

    /// Returns `false` if the binding had already been produced.
    pub fn record_produced(&mut self, binding: ConceptMap) -> bool {
        self.produced.insert(binding)
    }

    pub fn produced_count(&self) -> usize {
        self.produced.len()
    }

    pub fn add_downstream(&mut self, request: Request) {
        if !self.downstreams.contains(&request) {
            self.downstreams.push_back(request);
        }
    }

    pub fn remove_downstream(&mut self, request: &Request) {
        self.downstreams.retain(|open| open != request);
    }

    pub fn has_downstream(&self) -> bool {
        !self.downstreams.is_empty()
    }

    /// The most recently issued downstream request still open.
    ///
    /// Open requests are kept in the order they were issued, but resumed from
    /// the newest end rather than first-in first-out. A conjunction thereby
    /// drains the deepest open step of its plan before it backtracks to an
    /// earlier one, which is the depth-first order the plan is walked in.
    pub fn next_downstream(&self) -> Option<Request> {
        self.downstreams.back().cloned()
    }

    pub fn has_traversal(&self) -> bool {
        self.traversal.is_some()
    }

    /// Next binding of the local traversal. The traversal is released as soon
    /// as it is exhausted or fails.
    pub async fn next_traversal(&mut self) -> Result<Option<ConceptMap>, ProducerError> {
        let Some(traversal) = self.traversal.as_mut() else {
            return Ok(None);
        };
        match traversal.next_async().await {
            Some(Ok(binding)) => Ok(Some(binding)),
            Some(Err(error)) => {
                self.traversal = None;
                Err(error)
            }
            None => {
                self.traversal = None;
                Ok(None)
            }
        }
    }

    pub fn recycle(&mut self) {
        if let Some(mut traversal) = self.traversal.take() {
            traversal.recycle();
        }
        self.downstreams.clear();
    }
}
