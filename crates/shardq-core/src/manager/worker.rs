use std::{
    any::Any,
    panic::{AssertUnwindSafe, resume_unwind},
    time::{Duration, Instant},
};

use futures::FutureExt;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

use super::Shared;
use crate::{
    events::{Event, EventKind},
    metrics::ProcessOutcome,
    processor::ProcessError,
    queue::WorkKey,
};

/// Pause before a worker loop that died from a panic is started again.
const WORKER_RESTART_DELAY: Duration = Duration::from_millis(100);

impl<K: WorkKey> Shared<K> {
    /// Keep worker `id` alive until cancellation or queue shutdown.
    ///
    /// A panic that escapes the per-call isolation (queue or metrics code) restarts
    /// the loop when panic recovery is enabled, so the pool never shrinks. With
    /// recovery disabled it propagates to `start`.
    pub(super) async fn supervise_worker(&self, id: usize, token: CancellationToken) {
        loop {
            let Err(payload) = AssertUnwindSafe(self.run_worker(id, token.clone()))
                .catch_unwind()
                .await
            else {
                return;
            };
            if !self.config.recover_panic {
                resume_unwind(payload);
            }

            let reason = panic_message(payload.as_ref());
            error!(worker = id, %reason, "worker loop panicked, restarting");
            tokio::select! {
                biased;
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(WORKER_RESTART_DELAY) => {}
            }
        }
    }

    /// Pop, handle, pause; until cancellation or queue shutdown.
    async fn run_worker(&self, id: usize, token: CancellationToken) {
        trace!(worker = id, "worker started");
        loop {
            let popped = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                key = self.queue.get() => key,
            };
            let Some(key) = popped else {
                debug!(worker = id, "queue shut down, worker exiting");
                break;
            };

            self.handle(id, &token, key).await;

            if !pause(&token, self.config.dequeue_jitter).await {
                break;
            }
        }

        self.bus.publish(
            Event::new(EventKind::WorkerStopped, self.name.clone()).with_worker(id),
        );
        trace!(worker = id, "worker stopped");
    }

    /// Single-flight dispatch of one popped key.
    async fn handle(&self, worker: usize, token: &CancellationToken, key: K) {
        let Some(_claim) = self.in_progress.try_claim(&key) else {
            // Another worker owns the key: acknowledge the pop and offer it again later.
            self.queue.done(&key);
            self.queue
                .add_after(key.clone(), self.config.duplicate_requeue);

            self.metrics.record_duplicate_deferred(&self.name);
            self.bus.publish(
                Event::new(EventKind::KeyDeferred, self.name.clone())
                    .with_worker(worker)
                    .with_key(&key)
                    .with_delay_ms(millis(self.config.duplicate_requeue)),
            );
            debug!(worker, key = %key, "key already in progress, deferred");
            return;
        };

        self.queue.done(&key);
        self.reconcile(worker, token, &key).await;
    }

    /// Call the processor with panic isolation and map the outcome to queue operations.
    async fn reconcile(&self, worker: usize, token: &CancellationToken, key: &K) {
        let started = Instant::now();
        self.metrics.record_process_started(&self.name);
        self.bus.publish(
            Event::new(EventKind::ProcessStarting, self.name.clone())
                .with_worker(worker)
                .with_key(key),
        );

        let result = match AssertUnwindSafe(self.processor.process(token, key))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                self.bus.publish(
                    Event::new(EventKind::ProcessPanicked, self.name.clone())
                        .with_worker(worker)
                        .with_key(key)
                        .with_reason(reason.as_str()),
                );

                if !self.config.recover_panic {
                    error!(worker, key = %key, %reason, "process panicked and recovery is disabled");
                    self.metrics.record_process_completed(
                        &self.name,
                        ProcessOutcome::Panic,
                        elapsed_ms(started),
                    );
                    resume_unwind(payload);
                }
                Err(ProcessError::Panicked { reason })
            }
        };

        let outcome = match result {
            Err(err) => {
                self.queue.add_rate_limited(key.clone());
                let attempt = self.queue.num_requeues(key);
                self.bus.publish(
                    Event::new(EventKind::ProcessFailed, self.name.clone())
                        .with_worker(worker)
                        .with_key(key)
                        .with_attempt(attempt)
                        .with_reason(err.to_string()),
                );
                debug!(worker, key = %key, attempt, error = %err, "process failed, rate-limited retry");

                if err.is_panic() {
                    ProcessOutcome::Panic
                } else {
                    ProcessOutcome::Failure
                }
            }
            Ok(ok) => match ok.requeue_after() {
                Some(delay) => {
                    self.queue.forget(key);
                    self.queue.add_after(key.clone(), delay);
                    self.bus.publish(
                        Event::new(EventKind::RequeueScheduled, self.name.clone())
                            .with_worker(worker)
                            .with_key(key)
                            .with_delay_ms(millis(delay)),
                    );
                    trace!(worker, key = %key, ?delay, "process requested requeue");
                    ProcessOutcome::Requeued
                }
                None => {
                    self.queue.forget(key);
                    self.bus.publish(
                        Event::new(EventKind::ProcessSucceeded, self.name.clone())
                            .with_worker(worker)
                            .with_key(key),
                    );
                    trace!(worker, key = %key, "process converged");
                    ProcessOutcome::Stable
                }
            },
        };

        self.metrics
            .record_process_completed(&self.name, outcome, elapsed_ms(started));
    }
}

/// Sleep a random duration in `[0, bound)`. Returns `false` if cancelled meanwhile.
async fn pause(token: &CancellationToken, bound: Duration) -> bool {
    let wait = jitter(bound);
    if wait.is_zero() {
        return !token.is_cancelled();
    }
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(wait) => true,
    }
}

fn jitter(bound: Duration) -> Duration {
    let nanos = u64::try_from(bound.as_nanos()).unwrap_or(u64::MAX);
    if nanos == 0 {
        return Duration::ZERO;
    }
    Duration::from_nanos(rand::rng().random_range(0..nanos))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn elapsed_ms(started: Instant) -> u64 {
    millis(started.elapsed())
}

#[cfg(test)]
mod helper_tests {
    use super::*;

    #[test]
    fn jitter_stays_below_bound() {
        let bound = Duration::from_millis(20);
        for _ in 0..1_000 {
            assert!(jitter(bound) < bound);
        }
        assert_eq!(jitter(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn panic_message_handles_common_payloads() {
        let p: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(p.as_ref()), "static str");

        let p: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(p.as_ref()), "owned");

        let p: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(p.as_ref()), "unknown panic payload");
    }
}
