mod domain;
pub use domain::{
    DEFAULT_DEQUEUE_JITTER_MS, DEFAULT_DUPLICATE_REQUEUE_MS, DEFAULT_WORKERS, Flag, NamespacedName,
};

mod error;
pub use error::{ModelError, ModelResult};

mod kind;
pub use kind::{ControllerKind, parse_kind_list};

mod spec;
pub use spec::ManagerSpec;

mod strategy;
pub use strategy::RateLimitStrategy;
