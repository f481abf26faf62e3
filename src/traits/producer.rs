// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ProducerError;
use std::sync::Arc;

/// Receiving side of a producer.
///
/// A sink accepts items and exactly one terminal signal per logical stream.
/// Calls arriving after the sink has been recycled or terminated are ignored.
pub trait Sink<T>: Send + Sync {
    fn put(&self, item: T);

    /// Signals that the producer has nothing more to offer, successfully or not.
    fn done(&self, outcome: Result<(), ProducerError>);
}

/// A lazy, resumable source of items delivered into a sink in bounded batches.
///
/// `produce` is fire-and-forget: implementations schedule the batch onto a worker
/// pool and return immediately. A batch delivers exactly `count` items unless it
/// calls `done`, which it does only when the producer has run dry or failed.
/// Dropping every sink of a batch that still owes items abandons the stream.
pub trait Producer<T>: Send + Sync {
    fn produce(&self, sink: Arc<dyn Sink<T>>, count: usize);

    /// Releases held resources. Idempotent, and safe on a producer that was
    /// never drained or is mid-batch.
    fn recycle(&self);

    fn name(&self) -> &str {
        "producer"
    }
}
