//! Processor abstraction driven by the manager.
//!
//! A processor owns a queue and knows how to converge one key. Concrete
//! processors live with the callers; the manager only needs this trait.
mod error;
pub use error::ProcessError;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::queue::{QueueRef, WorkKey};

/// Successful result of a process call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    /// Converged. Nothing is scheduled until someone adds the key again.
    #[default]
    Stable,
    /// Converged for now, look at the key again after the delay.
    ///
    /// A zero delay is treated as [`Outcome::Stable`].
    RequeueAfter(Duration),
}

impl Outcome {
    /// Explicit delay requested by the outcome, if any.
    pub fn requeue_after(&self) -> Option<Duration> {
        match self {
            Outcome::RequeueAfter(d) if !d.is_zero() => Some(*d),
            _ => None,
        }
    }
}

/// Unit of work driven by a [`crate::Manager`].
///
/// Implementations must:
/// - be idempotent: the same key may be processed many times;
/// - not block forever: a call occupies one worker for its whole duration;
/// - treat `ctx` as advisory: the manager never aborts an in-flight call,
///   cancellation only tells the processor that shutdown is under way.
#[async_trait]
pub trait Processor: Send + Sync + 'static {
    type Key: WorkKey;

    /// Queue the manager pops keys from.
    fn queue(&self) -> QueueRef<Self::Key>;

    /// Converge the state identified by `key`.
    async fn process(
        &self,
        ctx: &CancellationToken,
        key: &Self::Key,
    ) -> Result<Outcome, ProcessError>;

    /// Processor name used in logs, events and metrics.
    fn name(&self) -> &str;
}

/// Type-erased processor handle.
pub type DynProcessor<K> = Arc<dyn Processor<Key = K>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delay_is_not_a_requeue() {
        assert_eq!(Outcome::RequeueAfter(Duration::ZERO).requeue_after(), None);
        assert_eq!(Outcome::Stable.requeue_after(), None);
        assert_eq!(
            Outcome::RequeueAfter(Duration::from_secs(3)).requeue_after(),
            Some(Duration::from_secs(3))
        );
    }

    #[test]
    fn process_error_messages() {
        assert_eq!(ProcessError::fail("api unavailable").to_string(), "api unavailable");

        let panicked = ProcessError::Panicked {
            reason: "boom".into(),
        };
        assert!(panicked.is_panic());
        assert_eq!(panicked.to_string(), "panicked: boom");

        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "deadline");
        let wrapped = ProcessError::from(io);
        assert!(!wrapped.is_panic());
        assert_eq!(wrapped.to_string(), "deadline");
    }
}
