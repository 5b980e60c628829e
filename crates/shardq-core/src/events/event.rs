use std::{fmt, sync::Arc};

/// Classification of manager events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Worker pool spawned.
    ManagerStarting,
    /// All workers joined after cancellation.
    ManagerStopped,
    /// A worker left its loop (cancellation or queue shutdown).
    WorkerStopped,
    /// A key was popped while another worker owned it and was re-scheduled.
    KeyDeferred,
    /// A worker is about to call `process`.
    ProcessStarting,
    /// `process` converged; the key is forgotten.
    ProcessSucceeded,
    /// `process` converged and asked for another look after a delay.
    RequeueScheduled,
    /// `process` failed; a rate-limited retry is scheduled.
    ProcessFailed,
    /// `process` panicked.
    ProcessPanicked,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ManagerStarting => "manager_starting",
            EventKind::ManagerStopped => "manager_stopped",
            EventKind::WorkerStopped => "worker_stopped",
            EventKind::KeyDeferred => "key_deferred",
            EventKind::ProcessStarting => "process_starting",
            EventKind::ProcessSucceeded => "process_succeeded",
            EventKind::RequeueScheduled => "requeue_scheduled",
            EventKind::ProcessFailed => "process_failed",
            EventKind::ProcessPanicked => "process_panicked",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single manager event.
///
/// Optional fields are filled only when they make sense for the kind:
/// `key` for per-item events, `attempt` for failures, `delay_ms` for anything
/// that schedules the key again, `reason` for failures and panics.
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub processor: Arc<str>,
    pub worker: Option<usize>,
    pub key: Option<Arc<str>>,
    pub attempt: Option<u32>,
    pub delay_ms: Option<u64>,
    pub reason: Option<Arc<str>>,
}

impl Event {
    pub fn new(kind: EventKind, processor: Arc<str>) -> Self {
        Self {
            kind,
            processor,
            worker: None,
            key: None,
            attempt: None,
            delay_ms: None,
            reason: None,
        }
    }

    pub fn with_worker(mut self, worker: usize) -> Self {
        self.worker = Some(worker);
        self
    }

    pub fn with_key(mut self, key: impl fmt::Display) -> Self {
        self.key = Some(key.to_string().into());
        self
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
