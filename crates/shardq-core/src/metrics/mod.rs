//! Metrics collection abstraction for managers.
//!
//! Backends (prometheus, statsd, etc) implement [`MetricsBackend`] and are handed to
//! [`crate::ManagerBuilder::with_metrics`] or [`crate::Supervisor::with_metrics`].
mod backend;
pub use backend::{MetricsBackend, MetricsHandle, ProcessOutcome};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
