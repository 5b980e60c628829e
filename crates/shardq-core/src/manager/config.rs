use std::time::Duration;

use shardq_model::{
    DEFAULT_DEQUEUE_JITTER_MS, DEFAULT_DUPLICATE_REQUEUE_MS, DEFAULT_WORKERS, ManagerSpec,
};

use crate::error::CoreError;

/// Runtime manager settings. Immutable once the manager is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Number of worker loops.
    pub workers: usize,
    /// Turn a panicking process call into a retryable failure.
    pub recover_panic: bool,
    /// Exclusive upper bound of the random pause between two pops of one worker.
    pub dequeue_jitter: Duration,
    /// Delay before a key popped while in progress is offered again.
    pub duplicate_requeue: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            recover_panic: true,
            dequeue_jitter: Duration::from_millis(DEFAULT_DEQUEUE_JITTER_MS),
            duplicate_requeue: Duration::from_millis(DEFAULT_DUPLICATE_REQUEUE_MS),
        }
    }
}

impl ManagerConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.workers == 0 {
            return Err(CoreError::InvalidConfig(
                "worker count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl From<&ManagerSpec> for ManagerConfig {
    fn from(spec: &ManagerSpec) -> Self {
        Self {
            workers: spec.workers,
            recover_panic: spec.recover_panic.is_enabled(),
            dequeue_jitter: Duration::from_millis(spec.dequeue_jitter_ms),
            duplicate_requeue: Duration::from_millis(spec.duplicate_requeue_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shardq_model::Flag;

    #[test]
    fn default_matches_model_defaults() {
        assert_eq!(ManagerConfig::default(), ManagerConfig::from(&ManagerSpec::default()));
    }

    #[test]
    fn from_spec_converts_units() {
        let spec = ManagerSpec {
            workers: 2,
            recover_panic: Flag::disabled(),
            dequeue_jitter_ms: 0,
            duplicate_requeue_ms: 250,
        };
        let cfg = ManagerConfig::from(&spec);

        assert_eq!(cfg.workers, 2);
        assert!(!cfg.recover_panic);
        assert_eq!(cfg.dequeue_jitter, Duration::ZERO);
        assert_eq!(cfg.duplicate_requeue, Duration::from_millis(250));
    }

    #[test]
    fn zero_workers_rejected() {
        let cfg = ManagerConfig {
            workers: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(CoreError::InvalidConfig(_))));
    }
}
