//! Work queue contract consumed by the manager.
//!
//! The manager never owns the queue: a [`crate::Processor`] hands it out and
//! producers (watchers, timers, tests) push keys into the same instance.
use std::{fmt, hash::Hash, sync::Arc, time::Duration};

use async_trait::async_trait;

/// Bound shared by every work-queue key.
///
/// Keys are compared for equality to collapse duplicates and rendered with
/// `Display` in logs and events.
pub trait WorkKey: Clone + Eq + Hash + fmt::Display + Send + Sync + 'static {}

impl<T> WorkKey for T where T: Clone + Eq + Hash + fmt::Display + Send + Sync + 'static {}

/// Keyed, rate-limiting work queue.
///
/// Contract:
/// - `add` of a key that is already queued (not yet popped) is a no-op;
/// - a key added while popped and not yet `done` is delivered again after `done`;
/// - `get` waits for the next key and returns `None` once the queue is shut down and drained;
/// - `get` is cancellation safe: dropping the future never loses a key.
#[async_trait]
pub trait Queue<K: WorkKey>: Send + Sync {
    /// Enqueue a key.
    fn add(&self, key: K);

    /// Enqueue a key once `delay` has elapsed.
    fn add_after(&self, key: K, delay: Duration);

    /// Enqueue a key after the delay computed by the queue's rate limiter.
    fn add_rate_limited(&self, key: K);

    /// Reset the failure history the rate limiter keeps for a key.
    fn forget(&self, key: &K);

    /// Number of rate-limited re-deliveries recorded for a key since the last `forget`.
    fn num_requeues(&self, key: &K) -> u32;

    /// Wait for the next key.
    async fn get(&self) -> Option<K>;

    /// Mark a popped key as no longer being processed.
    fn done(&self, key: &K);

    /// Stop accepting keys and release all waiters once drained.
    fn shut_down(&self);

    fn is_shutting_down(&self) -> bool;

    /// Number of keys ready to be popped.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared handle to a queue implementation.
pub type QueueRef<K> = Arc<dyn Queue<K>>;
