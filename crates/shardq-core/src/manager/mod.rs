//! Keyed worker pool over a processor's queue.
//!
//! - Runs a fixed number of workers that pop keys from the processor queue.
//! - Guarantees a key is never processed by two workers at once.
//! - Turns each process outcome into the matching queue call (forget, delayed add, rate-limited add).
//! - Isolates panics per key.
mod builder;
pub use builder::ManagerBuilder;

mod config;
pub use config::ManagerConfig;

mod inflight;
mod worker;

use std::{panic::resume_unwind, sync::Arc};

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::{
    events::{Event, EventBus, EventKind},
    metrics::MetricsHandle,
    processor::DynProcessor,
    queue::{QueueRef, WorkKey},
};
use inflight::InProgress;

/// Drives one [`crate::Processor`] with a bounded pool of workers.
///
/// A manager is built once per processor and consumed by [`Manager::start`]. It
/// keeps no state beyond the in-progress set; everything else lives in the queue.
pub struct Manager<K: WorkKey> {
    shared: Arc<Shared<K>>,
}

/// State shared by all workers of a manager.
pub(crate) struct Shared<K: WorkKey> {
    name: Arc<str>,
    processor: DynProcessor<K>,
    queue: QueueRef<K>,
    config: ManagerConfig,
    in_progress: InProgress<K>,
    metrics: MetricsHandle,
    bus: EventBus,
}

impl<K: WorkKey> Manager<K> {
    /// Start building a manager for `processor` with default settings.
    pub fn builder(processor: DynProcessor<K>) -> ManagerBuilder<K> {
        ManagerBuilder::new(processor)
    }

    pub(crate) fn from_parts(
        processor: DynProcessor<K>,
        config: ManagerConfig,
        metrics: MetricsHandle,
        bus: EventBus,
    ) -> Self {
        let shared = Shared {
            name: Arc::from(processor.name()),
            queue: processor.queue(),
            processor,
            config,
            in_progress: InProgress::new(),
            metrics,
            bus,
        };
        Self {
            shared: Arc::new(shared),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.shared.config
    }

    /// Run the worker pool until `token` is cancelled.
    ///
    /// Spawns `workers` loops, then waits for cancellation. After cancellation it
    /// waits for every worker to finish the item it is processing; when this
    /// returns no process call of this manager is running.
    ///
    /// With panic recovery disabled, a panic in `process` is re-raised from here
    /// as soon as the worker dies. With recovery enabled a worker that panics
    /// outside `process` is restarted instead.
    #[instrument(level = "debug", skip_all, fields(processor = %self.shared.name, workers = self.shared.config.workers))]
    pub async fn start(self, token: CancellationToken) {
        self.shared
            .bus
            .publish(Event::new(EventKind::ManagerStarting, self.shared.name.clone()));

        let mut workers = JoinSet::new();
        for id in 0..self.shared.config.workers {
            let shared = Arc::clone(&self.shared);
            let token = token.clone();
            workers.spawn(async move { shared.supervise_worker(id, token).await });
        }
        info!("manager started");

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                joined = workers.join_next() => match joined {
                    Some(Err(e)) if e.is_panic() => resume_unwind(e.into_panic()),
                    Some(_) => continue,
                    None => {
                        // Every worker left because the queue shut down.
                        debug!("all workers exited, waiting for cancellation");
                        token.cancelled().await;
                        break;
                    }
                },
            }
        }

        debug!("cancellation observed, joining workers");
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    resume_unwind(e.into_panic());
                }
            }
        }

        self.shared
            .bus
            .publish(Event::new(EventKind::ManagerStopped, self.shared.name.clone()));
        info!("manager stopped");
    }
}
