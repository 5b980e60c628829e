#![cfg(feature = "subscriber")]

//! Manager event logging.
//!
//! Maps manager events to `tracing` records with structured fields. Routine
//! per-key traffic stays at trace/debug, failures and panics are errors.

use std::borrow::Borrow;

use shardq_core::{Event, EventKind, Subscribe};
use tracing::{debug, error, info, trace};

/// Subscriber that logs every manager event.
#[derive(Debug, Default, Clone, Copy)]
pub struct Subscriber;

impl Subscribe for Subscriber {
    fn on_event(&self, event: &Event) {
        log_event(event);
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

fn log_event<E: View>(e: E) {
    let msg = message_for(e.kind());

    match e.kind() {
        EventKind::ManagerStarting | EventKind::ManagerStopped => {
            info!(processor = e.processor(), "{msg}")
        }
        EventKind::WorkerStopped => trace!(processor = e.processor(), worker = e.worker(), "{msg}"),

        EventKind::ProcessStarting => {
            trace!(processor = e.processor(), worker = e.worker(), key = e.key(), "{msg}")
        }
        EventKind::ProcessSucceeded => {
            debug!(processor = e.processor(), worker = e.worker(), key = e.key(), "{msg}")
        }
        EventKind::RequeueScheduled => debug!(
            processor = e.processor(),
            key = e.key(),
            delay_ms = e.delay_ms(),
            "{msg}"
        ),
        EventKind::KeyDeferred => debug!(
            processor = e.processor(),
            worker = e.worker(),
            key = e.key(),
            delay_ms = e.delay_ms(),
            "{msg}"
        ),

        EventKind::ProcessFailed => error!(
            processor = e.processor(),
            key = e.key(),
            attempt = e.attempt(),
            reason = e.reason(),
            "{msg}"
        ),
        EventKind::ProcessPanicked => error!(
            processor = e.processor(),
            worker = e.worker(),
            key = e.key(),
            reason = e.reason(),
            "{msg}"
        ),
    }
}

/// Field accessors with placeholders for absent values.
trait View {
    fn kind(&self) -> EventKind;
    fn processor(&self) -> &str;
    fn key(&self) -> &str;
    fn reason(&self) -> &str;
    fn worker(&self) -> usize;
    fn attempt(&self) -> u32;
    fn delay_ms(&self) -> u64;
}

impl<T: Borrow<Event>> View for T {
    #[inline]
    fn kind(&self) -> EventKind {
        self.borrow().kind
    }

    #[inline]
    fn processor(&self) -> &str {
        &self.borrow().processor
    }

    #[inline]
    fn key(&self) -> &str {
        self.borrow().key.as_deref().unwrap_or("unknown")
    }

    #[inline]
    fn reason(&self) -> &str {
        self.borrow().reason.as_deref().unwrap_or("unknown")
    }

    #[inline]
    fn worker(&self) -> usize {
        self.borrow().worker.unwrap_or(0)
    }

    #[inline]
    fn attempt(&self) -> u32 {
        self.borrow().attempt.unwrap_or(0)
    }

    #[inline]
    fn delay_ms(&self) -> u64 {
        self.borrow().delay_ms.unwrap_or(0)
    }
}

#[inline]
fn message_for(kind: EventKind) -> &'static str {
    match kind {
        EventKind::ManagerStarting => "manager starting workers",
        EventKind::ManagerStopped => "manager stopped, all workers joined",
        EventKind::WorkerStopped => "worker stopped",
        EventKind::KeyDeferred => "key already in progress, deferred",
        EventKind::ProcessStarting => "processing key",
        EventKind::ProcessSucceeded => "key processed",
        EventKind::RequeueScheduled => "key processed, requeue scheduled",
        EventKind::ProcessFailed => "error processing key, retry scheduled",
        EventKind::ProcessPanicked => "panic while processing key",
    }
}
