pub mod error;
pub mod events;
pub mod manager;
pub mod metrics;
pub mod processor;
pub mod queue;
pub mod registry;
pub mod supervisor;

pub use error::CoreError;
pub use events::{Event, EventKind, Subscribe};
pub use manager::{Manager, ManagerBuilder, ManagerConfig};
pub use metrics::{MetricsBackend, MetricsHandle, NoOpMetrics, ProcessOutcome, noop_metrics};
pub use processor::{DynProcessor, Outcome, ProcessError, Processor};
pub use queue::{Queue, QueueRef, WorkKey};
pub use registry::{ProcessorCatalog, build_processors};
pub use supervisor::Supervisor;

pub mod prelude {
    pub use crate::error::CoreError;
    pub use crate::events::{Event, EventKind, Subscribe};
    pub use crate::manager::Manager;
    pub use crate::processor::{Outcome, ProcessError, Processor};
    pub use crate::queue::{Queue, QueueRef};
    pub use crate::registry::ProcessorCatalog;
    pub use crate::supervisor::Supervisor;
}
