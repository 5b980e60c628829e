use crate::metrics::backend::{MetricsBackend, ProcessOutcome};

/// Metrics backend that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_process_started(&self, _: &str) {}

    #[inline(always)]
    fn record_process_completed(&self, _: &str, _: ProcessOutcome, _: u64) {}

    #[inline(always)]
    fn record_duplicate_deferred(&self, _: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_metrics_is_zero_size() {
        assert_eq!(std::mem::size_of::<NoOpMetrics>(), 0);
    }

    #[test]
    fn labels_are_stable() {
        let labels: Vec<_> = [
            ProcessOutcome::Stable,
            ProcessOutcome::Requeued,
            ProcessOutcome::Failure,
            ProcessOutcome::Panic,
        ]
        .iter()
        .map(ProcessOutcome::as_label)
        .collect();
        assert_eq!(labels, ["stable", "requeued", "failure", "panic"]);
    }
}
