use std::{sync::Arc, time::Duration};

use shardq_model::ManagerSpec;

use crate::{
    events::{EventBus, Subscribe},
    manager::{Manager, ManagerConfig},
    metrics::{MetricsHandle, noop_metrics},
    processor::DynProcessor,
    queue::WorkKey,
};

/// Builder-style options for a [`Manager`].
///
/// ```rust,ignore
/// let manager = Manager::builder(processor)
///     .with_workers(32)
///     .with_dequeue_jitter(Duration::from_millis(10))
///     .with_subscriber(Arc::new(tracing_subscriber))
///     .build()?;
/// ```
pub struct ManagerBuilder<K: WorkKey> {
    processor: DynProcessor<K>,
    config: ManagerConfig,
    metrics: MetricsHandle,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl<K: WorkKey> ManagerBuilder<K> {
    pub(crate) fn new(processor: DynProcessor<K>) -> Self {
        Self {
            processor,
            config: ManagerConfig::default(),
            metrics: noop_metrics(),
            subscribers: Vec::new(),
        }
    }

    /// Replace every setting with the values of a declarative spec.
    pub fn with_spec(mut self, spec: &ManagerSpec) -> Self {
        self.config = ManagerConfig::from(spec);
        self
    }

    pub fn with_config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Number of concurrent workers (default 16).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Recover panics raised by `process` (default `true`).
    ///
    /// When disabled the panic is re-raised and ends [`Manager::start`].
    pub fn with_recover_panic(mut self, recover: bool) -> Self {
        self.config.recover_panic = recover;
        self
    }

    /// Upper bound of the random pause between pops (default 1s). Zero disables it.
    pub fn with_dequeue_jitter(mut self, jitter: Duration) -> Self {
        self.config.dequeue_jitter = jitter;
        self
    }

    /// Delay for re-offering a key that was popped while in progress (default 5s).
    pub fn with_duplicate_requeue(mut self, delay: Duration) -> Self {
        self.config.duplicate_requeue = delay;
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    pub fn with_subscribers(mut self, subscribers: impl IntoIterator<Item = Arc<dyn Subscribe>>) -> Self {
        self.subscribers.extend(subscribers);
        self
    }

    /// Validate the configuration and build the manager.
    pub fn build(self) -> Result<Manager<K>, crate::error::CoreError> {
        self.config.validate()?;
        Ok(Manager::from_parts(
            self.processor,
            self.config,
            self.metrics,
            EventBus::new(self.subscribers),
        ))
    }
}
