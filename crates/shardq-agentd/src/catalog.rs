//! Simulated controllers for the demo agent.
//!
//! Each kind gets its own rate-limited queue seeded with a handful of objects and
//! a processor that sleeps, then fails, requeues or converges at random.
use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use rand::Rng;
use tokio_util::sync::CancellationToken;

use shardq_core::{
    CoreError, DynProcessor, Outcome, ProcessError, Processor, ProcessorCatalog, Queue, QueueRef,
};
use shardq_model::{ControllerKind, NamespacedName, RateLimitStrategy};
use shardq_queue::{WorkQueue, to_rate_limiter};

/// Behaviour of a simulated controller.
#[derive(Debug, Clone, Copy)]
pub struct Profile {
    pub latency: Duration,
    pub fail_ratio: f64,
    pub requeue_ratio: f64,
    pub requeue_after: Duration,
}

impl Profile {
    const fn new(latency_ms: u64, fail_ratio: f64, requeue_ratio: f64, requeue_after_s: u64) -> Self {
        Self {
            latency: Duration::from_millis(latency_ms),
            fail_ratio,
            requeue_ratio,
            requeue_after: Duration::from_secs(requeue_after_s),
        }
    }

    fn for_kind(kind: ControllerKind) -> Self {
        match kind {
            ControllerKind::GitRepository => Self::new(120, 0.05, 0.5, 30),
            ControllerKind::ServiceDeployment => Self::new(80, 0.10, 0.3, 20),
            ControllerKind::Cluster => Self::new(200, 0.05, 0.2, 60),
            ControllerKind::GlobalService => Self::new(40, 0.02, 0.1, 60),
            ControllerKind::Pipeline => Self::new(60, 0.15, 0.2, 15),
            ControllerKind::Stack => Self::new(250, 0.20, 0.4, 10),
            ControllerKind::NotificationSink => Self::new(20, 0.01, 0.0, 0),
            ControllerKind::Project => Self::new(30, 0.01, 0.0, 0),
        }
    }
}

/// Namespace objects of a kind live in; empty for cluster-scoped kinds.
fn namespace_for(kind: ControllerKind) -> &'static str {
    match kind {
        ControllerKind::Cluster | ControllerKind::GlobalService | ControllerKind::Project => "",
        ControllerKind::GitRepository
        | ControllerKind::ServiceDeployment
        | ControllerKind::Pipeline
        | ControllerKind::Stack
        | ControllerKind::NotificationSink => "infra",
    }
}

pub struct SimulatedProcessor {
    kind: ControllerKind,
    queue: Arc<WorkQueue<NamespacedName>>,
    profile: Profile,
}

#[async_trait]
impl Processor for SimulatedProcessor {
    type Key = NamespacedName;

    fn queue(&self) -> QueueRef<NamespacedName> {
        self.queue.clone()
    }

    async fn process(
        &self,
        ctx: &CancellationToken,
        key: &NamespacedName,
    ) -> Result<Outcome, ProcessError> {
        tokio::time::sleep(self.profile.latency).await;
        if ctx.is_cancelled() {
            // Finish quietly; the next run picks the object up again.
            return Ok(Outcome::Stable);
        }

        let roll: f64 = rand::rng().random();
        if roll < self.profile.fail_ratio {
            return Err(ProcessError::fail(format!("{} api unavailable for {key}", self.kind)));
        }
        if roll < self.profile.fail_ratio + self.profile.requeue_ratio {
            return Ok(Outcome::RequeueAfter(self.profile.requeue_after));
        }
        Ok(Outcome::Stable)
    }

    fn name(&self) -> &str {
        self.kind.as_str()
    }
}

/// Builds one [`SimulatedProcessor`] per kind with `objects` seeded keys.
pub struct DemoCatalog {
    objects: usize,
    rate_limit: RateLimitStrategy,
}

impl DemoCatalog {
    pub fn new(objects: usize) -> Self {
        Self {
            objects,
            rate_limit: RateLimitStrategy::default(),
        }
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitStrategy) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    fn build_with(&self, kind: ControllerKind, profile: Profile) -> Result<SimulatedProcessor, CoreError> {
        let limiter = to_rate_limiter(&self.rate_limit).map_err(|e| CoreError::Controller {
            kind,
            reason: e.to_string(),
        })?;
        let queue = Arc::new(WorkQueue::with_rate_limiter(kind.as_str(), limiter));

        let namespace = namespace_for(kind);
        for i in 0..self.objects {
            queue.add(NamespacedName::new(namespace, format!("{kind}-{i}")));
        }
        Ok(SimulatedProcessor {
            kind,
            queue,
            profile,
        })
    }
}

impl ProcessorCatalog<NamespacedName> for DemoCatalog {
    fn build(&self, kind: ControllerKind) -> Result<DynProcessor<NamespacedName>, CoreError> {
        Ok(Arc::new(self.build_with(kind, Profile::for_kind(kind))?))
    }
}
