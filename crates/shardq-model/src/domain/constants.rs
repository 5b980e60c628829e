//! Manager defaults shared by the model and runtime layers.
//!
//! Keeping them here gives [`crate::ManagerSpec`] and the core builder a single source of truth.

/// Number of worker loops a manager runs when nothing else is configured.
pub const DEFAULT_WORKERS: usize = 16;

/// Upper bound (exclusive) of the random pause a worker takes between two pops, in milliseconds.
pub const DEFAULT_DEQUEUE_JITTER_MS: u64 = 1_000;

/// Delay used to re-schedule a key that was popped while another worker still owns it, in milliseconds.
pub const DEFAULT_DUPLICATE_REQUEUE_MS: u64 = 5_000;
