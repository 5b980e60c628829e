use std::sync::Arc;

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry, proto::MetricFamily};

use shardq_core::{MetricsBackend, ProcessOutcome};

const NAMESPACE: &str = "shardq";

/// Prometheus implementation of [`MetricsBackend`].
///
/// Labels are bounded: `processor` is one per registered controller and
/// `outcome` is one of `stable`, `requeued`, `failure`, `panic`.
#[derive(Clone)]
pub struct PrometheusMetrics {
    started: CounterVec,
    completed: CounterVec,
    duration: HistogramVec,
    deferred: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Register the collectors in `registry`.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let started = CounterVec::new(
            Opts::new("process_started_total", "Process calls started").namespace(NAMESPACE),
            &["processor"],
        )?;
        registry.register(Box::new(started.clone()))?;

        let completed = CounterVec::new(
            Opts::new("process_completed_total", "Process calls finished, by outcome")
                .namespace(NAMESPACE),
            &["processor", "outcome"],
        )?;
        registry.register(Box::new(completed.clone()))?;

        let duration = HistogramVec::new(
            HistogramOpts::new("process_duration_seconds", "Wall time of process calls")
                .namespace(NAMESPACE)
                .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0]),
            &["processor"],
        )?;
        registry.register(Box::new(duration.clone()))?;

        let deferred = CounterVec::new(
            Opts::new(
                "duplicate_deferred_total",
                "Keys popped while another worker owned them",
            )
            .namespace(NAMESPACE),
            &["processor"],
        )?;
        registry.register(Box::new(deferred.clone()))?;

        Ok(Self {
            started,
            completed,
            duration,
            deferred,
            registry,
        })
    }

    /// Backend with a private registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Snapshot for a `/metrics` endpoint.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_process_started(&self, processor: &str) {
        self.started.with_label_values(&[processor]).inc();
    }

    fn record_process_completed(&self, processor: &str, outcome: ProcessOutcome, duration_ms: u64) {
        self.completed
            .with_label_values(&[processor, outcome.as_label()])
            .inc();
        self.duration
            .with_label_values(&[processor])
            .observe(duration_ms as f64 / 1000.0);
    }

    fn record_duplicate_deferred(&self, processor: &str) {
        self.deferred.with_label_values(&[processor]).inc();
    }
}
