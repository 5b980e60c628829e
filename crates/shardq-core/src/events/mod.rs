//! Manager lifecycle events and their subscribers.
//!
//! The manager publishes an [`Event`] at every decision point (dispatch,
//! deferral, retry, panic). Logging, crash reporting and tests observe the
//! manager by registering a [`Subscribe`] implementation.
mod bus;
pub(crate) use bus::EventBus;

mod event;
pub use event::{Event, EventKind};

/// Observer of manager events.
///
/// `on_event` runs inline on the worker that produced the event, so it must be quick.
/// A panicking subscriber is contained and does not affect the worker.
pub trait Subscribe: Send + Sync + 'static {
    fn on_event(&self, event: &Event);

    /// Subscriber name used when reporting its own failures.
    fn name(&self) -> &'static str;
}
