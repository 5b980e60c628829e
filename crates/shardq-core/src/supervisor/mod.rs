//! Runs one [`Manager`] per registered processor.
//! - Owns the manager settings, metrics and subscribers shared by every manager.
//! - Builds all managers before starting any of them.
//! - Returns once every manager has joined its workers.
use std::{panic::resume_unwind, sync::Arc};

use shardq_model::ManagerSpec;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::{
    error::CoreError,
    events::Subscribe,
    manager::Manager,
    metrics::{MetricsHandle, noop_metrics},
    processor::DynProcessor,
    queue::WorkKey,
};

/// Explicitly constructed owner of a set of processors.
pub struct Supervisor<K: WorkKey> {
    spec: ManagerSpec,
    metrics: MetricsHandle,
    subscribers: Vec<Arc<dyn Subscribe>>,
    processors: Vec<DynProcessor<K>>,
}

impl<K: WorkKey> Supervisor<K> {
    /// Create a supervisor applying `spec` to every manager.
    pub fn new(spec: ManagerSpec) -> Self {
        Self {
            spec,
            metrics: noop_metrics(),
            subscribers: Vec::new(),
            processors: Vec::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_subscribers(mut self, subscribers: impl IntoIterator<Item = Arc<dyn Subscribe>>) -> Self {
        self.subscribers.extend(subscribers);
        self
    }

    /// Register a processor. Order of registration is the order of startup.
    pub fn add(&mut self, processor: DynProcessor<K>) {
        self.processors.push(processor);
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Start every manager and wait until all of them returned.
    ///
    /// Fails before starting anything when the settings are invalid or no
    /// processor is registered. A panic re-raised by a manager (panic recovery
    /// disabled) propagates from here.
    #[instrument(level = "debug", skip_all, fields(processors = self.processors.len()))]
    pub async fn run(&self, token: CancellationToken) -> Result<(), CoreError> {
        if self.processors.is_empty() {
            return Err(CoreError::InvalidConfig("no processors registered".into()));
        }
        self.spec.validate()?;

        let managers = self
            .processors
            .iter()
            .map(|p| {
                Manager::builder(Arc::clone(p))
                    .with_spec(&self.spec)
                    .with_metrics(Arc::clone(&self.metrics))
                    .with_subscribers(self.subscribers.iter().cloned())
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut running = JoinSet::new();
        for manager in managers {
            debug!(processor = manager.name(), "starting manager");
            let token = token.clone();
            running.spawn(async move { manager.start(token).await });
        }
        info!(managers = running.len(), "supervisor running");

        while let Some(joined) = running.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    resume_unwind(e.into_panic());
                }
            }
        }
        info!("supervisor stopped");
        Ok(())
    }
}
