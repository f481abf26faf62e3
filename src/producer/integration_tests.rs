// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::{Handle, Runtime};

use crate::backends::stub::{FailingSource, PanickingSource, VecSource};
use crate::errors::ProducerError;
use crate::producer::{BaseProducer, BufferedAggregator, Watermarks};
use crate::traits::{Producer, Sink};

/// Integration tests for buffered aggregation over base producers
#[cfg(test)]
mod tests {
    use super::*;

    fn producer(name: &str, items: Vec<u32>, worker_pool: &Handle) -> Arc<dyn Producer<u32>> {
        Arc::new(BaseProducer::new(name, Box::new(VecSource::new(items)), worker_pool.clone()))
    }

    fn counted(
        name: &str,
        items: Vec<u32>,
        worker_pool: &Handle,
    ) -> (Arc<dyn Producer<u32>>, Arc<AtomicUsize>) {
        let recycled = Arc::new(AtomicUsize::new(0));
        let source = VecSource::new(items).with_recycle_counter(Arc::clone(&recycled));
        let producer: Arc<dyn Producer<u32>> =
            Arc::new(BaseProducer::new(name, Box::new(source), worker_pool.clone()));
        (producer, recycled)
    }

    fn watermarks(min: usize, max: usize) -> Watermarks {
        Watermarks::new(min, max).expect("valid watermarks")
    }

    #[test]
    fn test_two_producers_drain_in_order_then_complete() {
        let runtime = Runtime::new().unwrap();
        let (first, first_recycled) = counted("first", vec![1, 2, 3], runtime.handle());
        let (second, second_recycled) = counted("second", vec![4, 5, 6], runtime.handle());
        let mut aggregator = BufferedAggregator::new(vec![first, second], watermarks(2, 4));

        let mut items = Vec::new();
        for item in aggregator.by_ref() {
            items.push(item.expect("no failure"));
        }

        assert_eq!(items, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(aggregator.has_next(), Ok(false));
        assert!(aggregator.is_completed());

        // Exhausted producers are recycled on the worker that saw them finish.
        drop(aggregator);
        drop(runtime);
        assert_eq!(first_recycled.load(Ordering::SeqCst), 1);
        assert_eq!(second_recycled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_priority_order_holds_for_any_watermarks() {
        let runtime = Runtime::new().unwrap();
        for (min, max) in [(1, 2), (1, 5), (2, 4), (3, 4), (7, 8), (32, 64)] {
            let producers = vec![
                producer("p1", vec![1, 2], runtime.handle()),
                producer("p2", vec![3, 4], runtime.handle()),
            ];
            let items: Vec<u32> = BufferedAggregator::new(producers, watermarks(min, max))
                .map(|item| item.unwrap())
                .collect();
            assert_eq!(items, vec![1, 2, 3, 4], "watermarks min={} max={}", min, max);
        }
    }

    #[test]
    fn test_empty_producers_are_chained_over() {
        let runtime = Runtime::new().unwrap();
        let producers = vec![
            producer("empty-a", vec![], runtime.handle()),
            producer("one", vec![1], runtime.handle()),
            producer("empty-b", vec![], runtime.handle()),
            producer("two", vec![2, 3], runtime.handle()),
        ];

        let items: Vec<u32> = BufferedAggregator::new(producers, watermarks(1, 3))
            .map(|item| item.unwrap())
            .collect();

        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn test_failure_short_circuits_remaining_producers() {
        let runtime = Runtime::new().unwrap();
        let failing: Arc<dyn Producer<u32>> = Arc::new(BaseProducer::new(
            "failing",
            Box::new(FailingSource::new(vec![3], "boom")),
            runtime.handle().clone(),
        ));
        let (third, third_recycled) = counted("third", vec![4, 5], runtime.handle());
        let (fourth, fourth_recycled) = counted("fourth", vec![6], runtime.handle());
        let producers = vec![producer("first", vec![1, 2], runtime.handle()), failing, third, fourth];

        let results: Vec<Result<u32, ProducerError>> =
            BufferedAggregator::new(producers, watermarks(2, 4)).collect();

        assert_eq!(
            results,
            vec![Ok(1), Ok(2), Ok(3), Err(ProducerError::traversal("boom"))]
        );
        // Still queued when the failure arrived, recycled by the consumer.
        assert_eq!(third_recycled.load(Ordering::SeqCst), 1);
        assert_eq!(fourth_recycled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_buffer_never_exceeds_high_watermark() {
        let runtime = Runtime::new().unwrap();
        let producers = (0..4)
            .map(|p| producer("bulk", (p * 50..(p + 1) * 50).collect(), runtime.handle()))
            .collect();
        let mut aggregator = BufferedAggregator::new(producers, watermarks(3, 7));

        let mut count = 0;
        while aggregator.has_next().unwrap() {
            let state = aggregator.buffer_state();
            assert!(state.buffered + state.pending <= 7, "{:?}", state);
            assert_eq!(aggregator.next(), Some(Ok(count)));
            count += 1;
        }
        assert_eq!(count, 200);
    }

    #[test]
    fn test_recycle_mid_production_releases_every_producer_once() {
        let runtime = Runtime::new().unwrap();
        let sources: Vec<_> = (0..3)
            .map(|p| counted("bulk", (0..100).map(|i| p * 100 + i).collect(), runtime.handle()))
            .collect();
        let producers = sources.iter().map(|(producer, _)| Arc::clone(producer)).collect();
        let mut aggregator = BufferedAggregator::new(producers, watermarks(4, 8));

        for expected in 0..5 {
            assert_eq!(aggregator.next(), Some(Ok(expected)));
        }
        aggregator.recycle();

        assert_eq!(aggregator.next(), None);
        assert_eq!(aggregator.has_next(), Ok(false));
        for (_, recycled) in &sources {
            assert_eq!(recycled.load(Ordering::SeqCst), 1);
        }
        // A second recycle finds nothing left to release.
        aggregator.recycle();
        drop(aggregator);
        drop(runtime);
        for (_, recycled) in &sources {
            assert_eq!(recycled.load(Ordering::SeqCst), 1);
        }
    }

    /// Delivers one item of every batch, then lets the sink go without `done`.
    struct AbandoningProducer {
        produced: AtomicUsize,
        recycled: AtomicUsize,
    }

    impl AbandoningProducer {
        fn new() -> Self {
            Self {
                produced: AtomicUsize::new(0),
                recycled: AtomicUsize::new(0),
            }
        }
    }

    impl Producer<u32> for AbandoningProducer {
        fn produce(&self, sink: Arc<dyn Sink<u32>>, _count: usize) {
            let item = self.produced.fetch_add(1, Ordering::SeqCst) as u32;
            sink.put(item);
        }

        fn recycle(&self) {
            self.recycled.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &str {
            "abandoning"
        }
    }

    #[test]
    fn test_abandoned_batch_interrupts_the_stream_once() {
        let runtime = Runtime::new().unwrap();
        let abandoning = Arc::new(AbandoningProducer::new());
        let (queued, queued_recycled) = counted("queued", vec![10, 11], runtime.handle());
        let producers: Vec<Arc<dyn Producer<u32>>> = vec![Arc::clone(&abandoning) as Arc<dyn Producer<u32>>, queued];
        let mut aggregator = BufferedAggregator::new(producers, watermarks(2, 4));

        assert_eq!(aggregator.next(), Some(Ok(0)));
        match aggregator.next() {
            Some(Err(ProducerError::Interrupted { reason })) => {
                assert!(reason.contains("abandoning"), "{}", reason);
            }
            other => panic!("expected an interrupted stream, got {:?}", other),
        }
        assert_eq!(aggregator.next(), None);
        assert!(aggregator.is_completed());

        assert_eq!(abandoning.produced.load(Ordering::SeqCst), 1);
        assert_eq!(abandoning.recycled.load(Ordering::SeqCst), 1);
        assert_eq!(queued_recycled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_cursor_surfaces_as_interrupted() {
        let runtime = Runtime::new().unwrap();
        let recycled = Arc::new(AtomicUsize::new(0));
        let panicking: Arc<dyn Producer<u32>> = Arc::new(BaseProducer::new(
            "panicking",
            Box::new(PanickingSource::new(vec![1, 2], Arc::clone(&recycled))),
            runtime.handle().clone(),
        ));
        let mut aggregator = BufferedAggregator::new(vec![panicking], watermarks(2, 8));

        let results: Vec<Result<u32, ProducerError>> = aggregator.by_ref().collect();

        assert_eq!(results.len(), 3, "{:?}", results);
        assert_eq!(results[..2], [Ok(1), Ok(2)]);
        assert!(matches!(results[2], Err(ProducerError::Interrupted { .. })));
        // The unwound batch released the cursor lock, so recycling still reaches it.
        assert_eq!(recycled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_async_consumer() {
        let producers = vec![
            producer("a", vec![1, 2, 3], &Handle::current()),
            producer("b", vec![4], &Handle::current()),
            producer("c", vec![5, 6], &Handle::current()),
        ];
        let mut aggregator = BufferedAggregator::new(producers, watermarks(1, 2));

        let mut items = Vec::new();
        while let Some(item) = aggregator.next_async().await {
            items.push(item.unwrap());
        }

        assert_eq!(items, vec![1, 2, 3, 4, 5, 6]);
        assert!(aggregator.is_completed());
    }
}
