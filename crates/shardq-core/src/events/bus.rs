use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use tracing::warn;

use super::{Event, Subscribe};

/// Synchronous fan-out of events to every registered subscriber.
#[derive(Clone, Default)]
pub(crate) struct EventBus {
    subscribers: Arc<[Arc<dyn Subscribe>]>,
}

impl EventBus {
    pub(crate) fn new(subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        Self {
            subscribers: subscribers.into(),
        }
    }

    pub(crate) fn publish(&self, event: Event) {
        for sub in self.subscribers.iter() {
            if catch_unwind(AssertUnwindSafe(|| sub.on_event(&event))).is_err() {
                warn!(
                    subscriber = sub.name(),
                    event = %event.kind,
                    "subscriber panicked while handling an event"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::events::EventKind;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<EventKind>>);

    impl Subscribe for Recorder {
        fn on_event(&self, event: &Event) {
            self.0.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Exploding;

    impl Subscribe for Exploding {
        fn on_event(&self, _: &Event) {
            panic!("subscriber bug");
        }

        fn name(&self) -> &'static str {
            "exploding"
        }
    }

    #[test]
    fn panicking_subscriber_does_not_starve_others() {
        let rec = Arc::new(Recorder::default());
        let bus = EventBus::new(vec![Arc::new(Exploding), rec.clone()]);

        bus.publish(Event::new(EventKind::ProcessStarting, Arc::from("p")));
        bus.publish(Event::new(EventKind::ProcessSucceeded, Arc::from("p")));

        assert_eq!(
            *rec.0.lock().unwrap(),
            vec![EventKind::ProcessStarting, EventKind::ProcessSucceeded]
        );
    }

    #[test]
    fn empty_bus_is_fine() {
        EventBus::default().publish(Event::new(EventKind::ManagerStarting, Arc::from("p")));
    }
}
