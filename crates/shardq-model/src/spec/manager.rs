use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::{
    domain::{DEFAULT_DEQUEUE_JITTER_MS, DEFAULT_DUPLICATE_REQUEUE_MS, DEFAULT_WORKERS, Flag},
    error::{ModelError, ModelResult},
};

/// Declarative manager settings.
///
/// `ManagerSpec` is what a config file or environment provides; the core builder
/// turns it into an immutable runtime configuration.
///
/// Fields:
/// - `workers`: number of concurrent worker loops (must be at least 1);
/// - `recover_panic`: convert a panicking process call into a retryable failure
///   instead of bringing the process down;
/// - `dequeue_jitter_ms`: exclusive upper bound of the random pause between pops;
/// - `duplicate_requeue_ms`: delay before a key popped while in progress is offered again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct ManagerSpec {
    pub workers: usize,
    pub recover_panic: Flag,
    pub dequeue_jitter_ms: u64,
    pub duplicate_requeue_ms: u64,
}

impl Default for ManagerSpec {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            recover_panic: Flag::enabled(),
            dequeue_jitter_ms: DEFAULT_DEQUEUE_JITTER_MS,
            duplicate_requeue_ms: DEFAULT_DUPLICATE_REQUEUE_MS,
        }
    }
}

impl ManagerSpec {
    pub fn validate(&self) -> ModelResult<()> {
        if self.workers == 0 {
            return Err(ModelError::Invalid("workers must be at least 1".into()));
        }
        Ok(())
    }
}
