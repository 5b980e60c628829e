use std::sync::Arc;

/// How a single process call ended, for metrics classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Converged, nothing scheduled.
    Stable,
    /// Converged, explicit re-check scheduled.
    Requeued,
    /// Returned an error, rate-limited retry scheduled.
    Failure,
    /// Panicked.
    Panic,
}

impl ProcessOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            ProcessOutcome::Stable => "stable",
            ProcessOutcome::Requeued => "requeued",
            ProcessOutcome::Failure => "failure",
            ProcessOutcome::Panic => "panic",
        }
    }
}

/// Backend metrics collection interface.
///
/// Implementations are injected into the manager builder (or the supervisor)
/// and shared by every worker.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record that a worker is about to call `process`.
    ///
    /// # Arguments
    /// - `processor`: Processor name
    fn record_process_started(&self, processor: &str);
    /// Record the end of a process call.
    ///
    /// # Arguments
    /// - `processor`: Processor name
    /// - `outcome`: How the call ended
    /// - `duration_ms`: Wall time spent in the call
    fn record_process_completed(&self, processor: &str, outcome: ProcessOutcome, duration_ms: u64);
    /// Record a key that was popped while another worker still owned it.
    fn record_duplicate_deferred(&self, processor: &str);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
