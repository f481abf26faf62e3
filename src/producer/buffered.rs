// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Buffered aggregation of producers behind a single consumer iterator.
//!
//! The aggregator owns an ordered queue of producers and a buffer bounded by two
//! watermarks. It tracks how many items are buffered and how many were requested
//! from the head producer but not yet delivered (`pending`), and keeps
//! `buffered + pending <= max` at all times. A new batch is requested only once the
//! buffer has drained far enough that more than `max - min` slots are free, so the
//! consumer does not trigger a batch per item.
//!
//! # Consumer state machine
//!
//! `EMPTY -> FETCHED -> EMPTY -> ... -> COMPLETED`. `COMPLETED` is reached once the
//! terminal signal has been observed or the aggregator was recycled; it is sticky.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use the_reasoner::backends::stub::VecSource;
//! use the_reasoner::producer::{BaseProducer, BufferedAggregator, Watermarks};
//! use the_reasoner::traits::Producer;
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let producers: Vec<Arc<dyn Producer<u32>>> = vec![
//!     Arc::new(BaseProducer::new("first", Box::new(VecSource::new(vec![1, 2])), runtime.handle().clone())),
//!     Arc::new(BaseProducer::new("second", Box::new(VecSource::new(vec![3])), runtime.handle().clone())),
//! ];
//!
//! let aggregator = BufferedAggregator::new(producers, Watermarks::new(1, 2).unwrap());
//! let items: Vec<u32> = aggregator.map(|item| item.unwrap()).collect();
//! assert_eq!(items, vec![1, 2, 3]);
//! ```

use std::collections::VecDeque;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::consts::{DEFAULT_BUFFER_MAX, DEFAULT_BUFFER_MIN};
use crate::errors::{ConfigError, ProducerError};
use crate::observability::messages::producer::{
    AggregatorRecycled, BatchRequested, ProducerExhausted, ProducerFailed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Producer, Sink};

/// Low and high buffer watermarks, `0 < min < max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watermarks {
    min: usize,
    max: usize,
}

impl Watermarks {
    pub fn new(min: usize, max: usize) -> Result<Self, ConfigError> {
        if min == 0 || min >= max {
            return Err(ConfigError::InvalidWatermarks {
                buffer: "aggregator",
                min,
                max,
            });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }
}

impl Default for Watermarks {
    fn default() -> Self {
        Self {
            min: DEFAULT_BUFFER_MIN,
            max: DEFAULT_BUFFER_MAX,
        }
    }
}

/// Snapshot of the buffer accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferState {
    pub buffered: usize,
    pub pending: usize,
}

/// Channel payload: an item, or the single terminal signal of the stream.
enum Signal<T> {
    Item(T),
    Done(Result<(), ProducerError>),
}

struct Registered<T> {
    id: u64,
    producer: Arc<dyn Producer<T>>,
}

struct QueueState<T> {
    producers: VecDeque<Registered<T>>,
    buffered: usize,
    pending: usize,
    /// Sinks handed to the head producer that are still alive.
    head_sinks: usize,
    terminated: bool,
    sender: Option<mpsc::UnboundedSender<Signal<T>>>,
}

impl<T> QueueState<T> {
    /// Signals are only taken from the current head producer of a live queue.
    /// Late calls from a popped or recycled producer fall through here.
    fn accepts(&self, producer_id: u64) -> bool {
        !self.terminated
            && self
                .producers
                .front()
                .is_some_and(|head| head.id == producer_id)
    }

    fn terminate_with(&mut self, outcome: Result<(), ProducerError>) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(Signal::Done(outcome));
        }
        self.terminated = true;
    }

    fn head_name(&self) -> String {
        self.producers
            .front()
            .map(|head| head.producer.name().to_string())
            .unwrap_or_default()
    }
}

/// A batch requested under the queue lock, started once the lock is released.
struct Batch<T> {
    producer: Arc<dyn Producer<T>>,
    sink: Arc<dyn Sink<T>>,
    count: usize,
}

impl<T> Batch<T> {
    fn start(self) {
        self.producer.produce(self.sink, self.count);
    }
}

struct BufferQueue<T> {
    watermarks: Watermarks,
    state: Mutex<QueueState<T>>,
}

impl<T> BufferQueue<T> {
    fn buffer_state(&self) -> BufferState {
        let state = self.state.lock();
        BufferState {
            buffered: state.buffered,
            pending: state.pending,
        }
    }

    fn consumed(&self) {
        let mut state = self.state.lock();
        assert!(state.buffered > 0, "consumed an item that was never buffered");
        state.buffered -= 1;
    }

    /// Stops accepting signals and hands back every producer still queued.
    fn terminate(&self) -> Vec<Arc<dyn Producer<T>>> {
        let mut state = self.state.lock();
        state.terminated = true;
        state.sender = None;
        state.pending = 0;
        state.producers.drain(..).map(|registered| registered.producer).collect()
    }

    /// The last sink of the head producer is gone. Items it still owed will never
    /// arrive, so the stream is interrupted rather than left waiting.
    fn release_sink(&self, producer_id: u64) {
        let mut state = self.state.lock();
        if !state.accepts(producer_id) {
            return;
        }
        state.head_sinks = state.head_sinks.saturating_sub(1);
        if state.head_sinks > 0 || state.pending == 0 {
            return;
        }
        let name = state.head_name();
        let error = ProducerError::interrupted(format!(
            "{} stopped with {} requested items undelivered",
            name, state.pending
        ));
        ProducerFailed {
            producer: &name,
            error: &error,
        }
        .log();
        state.terminate_with(Err(error));
    }
}

impl<T: Send + 'static> BufferQueue<T> {
    fn may_produce(self: &Arc<Self>) {
        let batch = {
            let mut state = self.state.lock();
            self.replenish(&mut state)
        };
        if let Some(batch) = batch {
            batch.start();
        }
    }

    /// Books the next batch of the head producer, if the buffer has drained far
    /// enough. The caller starts it after releasing the lock.
    fn replenish(self: &Arc<Self>, state: &mut QueueState<T>) -> Option<Batch<T>> {
        if state.terminated {
            return None;
        }
        let head = state.producers.front()?;
        let (producer_id, producer) = (head.id, Arc::clone(&head.producer));

        let max = self.watermarks.max;
        assert!(
            state.buffered + state.pending <= max,
            "buffer overrun: buffered={} pending={} max={}",
            state.buffered,
            state.pending,
            max
        );
        let available = max - state.buffered - state.pending;
        if available <= max - self.watermarks.min {
            return None;
        }
        state.pending += available;
        state.head_sinks += 1;
        BatchRequested {
            producer: producer.name(),
            count: available,
            buffered: state.buffered,
            pending: state.pending,
        }
        .log();
        let sink: Arc<dyn Sink<T>> = Arc::new(BatchSink {
            queue: Arc::clone(self),
            producer_id,
        });
        Some(Batch {
            producer,
            sink,
            count: available,
        })
    }

    fn put(&self, producer_id: u64, item: T) {
        let mut state = self.state.lock();
        if !state.accepts(producer_id) {
            tracing::trace!(producer_id, "dropping item from an inactive producer");
            return;
        }
        let delivered = state
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(Signal::Item(item)).is_ok());
        if !delivered {
            return;
        }
        assert!(
            state.pending > 0,
            "producer delivered more items than were requested"
        );
        state.pending -= 1;
        state.buffered += 1;
    }

    fn done(self: &Arc<Self>, producer_id: u64, outcome: Result<(), ProducerError>) {
        let (finished, next_batch) = {
            let mut state = self.state.lock();
            if !state.accepts(producer_id) {
                tracing::trace!(producer_id, "ignoring completion from an inactive producer");
                return;
            }
            let finished = state.producers.pop_front();
            state.pending = 0;
            state.head_sinks = 0;
            let name = finished
                .as_ref()
                .map(|registered| registered.producer.name().to_string())
                .unwrap_or_default();

            let next_batch = match outcome {
                Err(error) => {
                    ProducerFailed {
                        producer: &name,
                        error: &error,
                    }
                    .log();
                    state.terminate_with(Err(error));
                    None
                }
                Ok(()) => {
                    ProducerExhausted {
                        producer: &name,
                        remaining: state.producers.len(),
                    }
                    .log();
                    if state.producers.is_empty() {
                        state.terminate_with(Ok(()));
                        None
                    } else {
                        self.replenish(&mut state)
                    }
                }
            };
            (finished, next_batch)
        };
        // Recycled and started outside the queue lock: a producer may hold its
        // own lock while it waits on ours.
        if let Some(registered) = finished {
            registered.producer.recycle();
        }
        if let Some(batch) = next_batch {
            batch.start();
        }
    }
}

/// The sink handed to one producer; it carries the producer's queue identity so
/// that late signals can be told apart from the current head's.
struct BatchSink<T> {
    queue: Arc<BufferQueue<T>>,
    producer_id: u64,
}

impl<T: Send + 'static> Sink<T> for BatchSink<T> {
    fn put(&self, item: T) {
        self.queue.put(self.producer_id, item);
    }

    fn done(&self, outcome: Result<(), ProducerError>) {
        self.queue.done(self.producer_id, outcome);
    }
}

impl<T> Drop for BatchSink<T> {
    fn drop(&mut self) {
        self.queue.release_sink(self.producer_id);
    }
}

enum IteratorState<T> {
    Empty,
    Fetched(T),
    Completed,
}

/// Consumer-facing iterator over an ordered list of producers.
///
/// Items of a producer are delivered before any item of the producers queued
/// after it. The blocking [`Iterator`] implementation must not be used from
/// inside an async task; use [`BufferedAggregator::next_async`] there instead.
pub struct BufferedAggregator<T> {
    queue: Arc<BufferQueue<T>>,
    receiver: mpsc::UnboundedReceiver<Signal<T>>,
    state: IteratorState<T>,
}

impl<T: Send + 'static> BufferedAggregator<T> {
    pub fn new(producers: Vec<Arc<dyn Producer<T>>>, watermarks: Watermarks) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let producers: VecDeque<Registered<T>> = producers
            .into_iter()
            .zip(0u64..)
            .map(|(producer, id)| Registered { id, producer })
            .collect();

        let mut state = QueueState {
            producers,
            buffered: 0,
            pending: 0,
            head_sinks: 0,
            terminated: false,
            sender: Some(sender),
        };
        if state.producers.is_empty() {
            state.terminate_with(Ok(()));
        }

        Self {
            queue: Arc::new(BufferQueue {
                watermarks,
                state: Mutex::new(state),
            }),
            receiver,
            state: IteratorState::Empty,
        }
    }

    /// Blocks until an item or the terminal signal is available.
    ///
    /// Returns the stream failure once, at the point it occurred; afterwards the
    /// iterator is completed and keeps returning `Ok(false)`.
    pub fn has_next(&mut self) -> Result<bool, ProducerError> {
        match self.state {
            IteratorState::Completed => return Ok(false),
            IteratorState::Fetched(_) => return Ok(true),
            IteratorState::Empty => {}
        }
        self.queue.may_produce();
        let signal = self.receiver.blocking_recv();
        self.accept(signal)
    }

    /// Async counterpart of [`BufferedAggregator::has_next`].
    pub async fn has_next_async(&mut self) -> Result<bool, ProducerError> {
        match self.state {
            IteratorState::Completed => return Ok(false),
            IteratorState::Fetched(_) => return Ok(true),
            IteratorState::Empty => {}
        }
        self.queue.may_produce();
        let signal = self.receiver.recv().await;
        self.accept(signal)
    }

    pub async fn next_async(&mut self) -> Option<Result<T, ProducerError>> {
        match self.has_next_async().await {
            Ok(true) => self.take_fetched().map(Ok),
            Ok(false) => None,
            Err(error) => Some(Err(error)),
        }
    }

    fn accept(&mut self, signal: Option<Signal<T>>) -> Result<bool, ProducerError> {
        match signal {
            Some(Signal::Item(item)) => {
                self.queue.consumed();
                self.state = IteratorState::Fetched(item);
                Ok(true)
            }
            Some(Signal::Done(outcome)) => {
                self.recycle();
                outcome.map(|()| false)
            }
            None => {
                self.recycle();
                Err(ProducerError::interrupted(
                    "buffer closed before the stream completed",
                ))
            }
        }
    }
}

impl<T> BufferedAggregator<T> {
    fn take_fetched(&mut self) -> Option<T> {
        match std::mem::replace(&mut self.state, IteratorState::Empty) {
            IteratorState::Fetched(item) => Some(item),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Releases every producer still referenced, whatever its state. Items still
    /// buffered or in flight are discarded.
    pub fn recycle(&mut self) {
        let producers = self.queue.terminate();
        if !producers.is_empty() {
            AggregatorRecycled {
                producers: producers.len(),
            }
            .log();
        }
        for producer in producers {
            producer.recycle();
        }
        self.state = IteratorState::Completed;
    }

    pub fn buffer_state(&self) -> BufferState {
        self.queue.buffer_state()
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, IteratorState::Completed)
    }
}

impl<T: Send + 'static> Iterator for BufferedAggregator<T> {
    type Item = Result<T, ProducerError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.has_next() {
            Ok(true) => self.take_fetched().map(Ok),
            Ok(false) => None,
            Err(error) => Some(Err(error)),
        }
    }
}

impl<T> Drop for BufferedAggregator<T> {
    fn drop(&mut self) {
        self.recycle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watermarks_reject_inverted_or_zero_bounds() {
        assert!(Watermarks::new(0, 4).is_err());
        assert!(Watermarks::new(4, 4).is_err());
        assert!(Watermarks::new(5, 4).is_err());
        let watermarks = Watermarks::new(2, 4).unwrap();
        assert_eq!((watermarks.min(), watermarks.max()), (2, 4));
    }

    #[test]
    fn test_default_watermarks() {
        let watermarks = Watermarks::default();
        assert_eq!(watermarks.min(), DEFAULT_BUFFER_MIN);
        assert_eq!(watermarks.max(), DEFAULT_BUFFER_MAX);
    }

    #[test]
    fn test_empty_aggregator_completes_immediately() {
        let mut aggregator: BufferedAggregator<u32> = BufferedAggregator::new(vec![], Watermarks::default());
        assert_eq!(aggregator.has_next(), Ok(false));
        assert!(aggregator.is_completed());
        assert_eq!(aggregator.next(), None);
    }
}
