// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;

use crate::errors::ProducerError;
use crate::traits::{Producer, Sink, TraversalSource};

type SharedCursor<T> = Arc<Mutex<Option<Box<dyn TraversalSource<T>>>>>;

/// Base-case producer draining a storage cursor on the worker pool.
///
/// Each `produce` call runs one blocking batch. Batches of the same producer are
/// serialized on the cursor, and items are handed to the sink while the cursor is
/// held, so a producer's items reach the sink in cursor order.
pub struct BaseProducer<T> {
    name: String,
    cursor: SharedCursor<T>,
    worker_pool: Handle,
}

enum BatchOutcome {
    MoreRemaining,
    Exhausted,
    Failed(ProducerError),
}

impl<T: Send + 'static> BaseProducer<T> {
    pub fn new(name: impl Into<String>, cursor: Box<dyn TraversalSource<T>>, worker_pool: Handle) -> Self {
        Self {
            name: name.into(),
            cursor: Arc::new(Mutex::new(Some(cursor))),
            worker_pool,
        }
    }
}

fn drain_batch<T>(cursor: &Mutex<Option<Box<dyn TraversalSource<T>>>>, sink: &dyn Sink<T>, count: usize) -> BatchOutcome {
    let mut guard = cursor.lock();
    // A recycled cursor has nothing left to give.
    let Some(source) = guard.as_mut() else {
        return BatchOutcome::Exhausted;
    };
    for _ in 0..count {
        match source.next() {
            Some(Ok(item)) => sink.put(item),
            Some(Err(error)) => return BatchOutcome::Failed(error),
            None => return BatchOutcome::Exhausted,
        }
    }
    BatchOutcome::MoreRemaining
}

impl<T: Send + 'static> Producer<T> for BaseProducer<T> {
    fn produce(&self, sink: Arc<dyn Sink<T>>, count: usize) {
        let cursor = Arc::clone(&self.cursor);
        self.worker_pool.spawn_blocking(move || {
            // The cursor lock is released before signalling, since `done` may
            // recycle this very producer.
            match drain_batch(&cursor, sink.as_ref(), count) {
                BatchOutcome::MoreRemaining => {}
                BatchOutcome::Exhausted => sink.done(Ok(())),
                BatchOutcome::Failed(error) => sink.done(Err(error)),
            }
        });
    }

    fn recycle(&self) {
        if let Some(mut source) = self.cursor.lock().take() {
            source.recycle();
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{FailingSource, PanickingSource, VecSource};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    #[derive(Debug, PartialEq)]
    enum Event {
        Item(u32),
        Done(Result<(), ProducerError>),
    }

    struct ChannelSink(mpsc::UnboundedSender<Event>);

    impl Sink<u32> for ChannelSink {
        fn put(&self, item: u32) {
            let _ = self.0.send(Event::Item(item));
        }

        fn done(&self, outcome: Result<(), ProducerError>) {
            let _ = self.0.send(Event::Done(outcome));
        }
    }

    fn channel_sink() -> (Arc<dyn Sink<u32>>, mpsc::UnboundedReceiver<Event>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Arc::new(ChannelSink(sender)), receiver)
    }

    #[tokio::test]
    async fn test_batch_stops_at_count_without_done() {
        let producer = BaseProducer::new("numbers", Box::new(VecSource::new(vec![1, 2, 3])), Handle::current());
        let (sink, mut events) = channel_sink();

        producer.produce(sink, 2);

        assert_eq!(events.recv().await, Some(Event::Item(1)));
        assert_eq!(events.recv().await, Some(Event::Item(2)));
        // The batch ends without a terminal signal; the sender side is dropped.
        assert_eq!(events.recv().await, None);
    }

    #[tokio::test]
    async fn test_exhaustion_signals_done() {
        let producer = BaseProducer::new("numbers", Box::new(VecSource::new(vec![7])), Handle::current());
        let (sink, mut events) = channel_sink();

        producer.produce(sink, 5);

        assert_eq!(events.recv().await, Some(Event::Item(7)));
        assert_eq!(events.recv().await, Some(Event::Done(Ok(()))));
    }

    #[tokio::test]
    async fn test_cursor_failure_signals_done_with_error() {
        let source = FailingSource::new(vec![1], "disk on fire");
        let producer = BaseProducer::new("failing", Box::new(source), Handle::current());
        let (sink, mut events) = channel_sink();

        producer.produce(sink, 5);

        assert_eq!(events.recv().await, Some(Event::Item(1)));
        assert_eq!(
            events.recv().await,
            Some(Event::Done(Err(ProducerError::traversal("disk on fire"))))
        );
        assert_eq!(events.recv().await, None);
    }

    #[tokio::test]
    async fn test_recycle_is_idempotent_and_ends_production() {
        let recycled = Arc::new(AtomicUsize::new(0));
        let source = VecSource::new(vec![1, 2, 3]).with_recycle_counter(Arc::clone(&recycled));
        let producer = BaseProducer::new("numbers", Box::new(source), Handle::current());

        producer.recycle();
        producer.recycle();
        assert_eq!(recycled.load(Ordering::SeqCst), 1);

        let (sink, mut events) = channel_sink();
        producer.produce(sink, 3);
        assert_eq!(events.recv().await, Some(Event::Done(Ok(()))));
    }

    #[tokio::test]
    async fn test_panicking_batch_does_not_wedge_the_cursor() {
        let recycled = Arc::new(AtomicUsize::new(0));
        let source = PanickingSource::new(vec![1], Arc::clone(&recycled));
        let producer = BaseProducer::new("panicking", Box::new(source), Handle::current());
        let (sink, mut events) = channel_sink();

        producer.produce(sink, 5);

        assert_eq!(events.recv().await, Some(Event::Item(1)));
        // The batch unwound while holding the cursor; its sink went with it.
        assert_eq!(events.recv().await, None);

        producer.recycle();
        assert_eq!(recycled.load(Ordering::SeqCst), 1);
    }
}
