mod flag;
pub use flag::Flag;

mod key;
pub use key::NamespacedName;

mod constants;
pub use constants::{DEFAULT_DEQUEUE_JITTER_MS, DEFAULT_DUPLICATE_REQUEUE_MS, DEFAULT_WORKERS};
