//! # Event bus for broadcasting orchestration events.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`] so that concurrent scheduling passes,
//! module start jobs and the shutdown sequencer can publish without blocking.
//!
//! ```text
//! Publishers (many):                     Receivers:
//!   Round pass  ──┐
//!   start job   ──┼──► Bus ──► orchestrator listener ──► SubscriberSet
//!   shutdown    ──┘      └───► Orchestrator::subscribe() receivers
//! ```
//!
//! ## Rules
//! - `publish()` never blocks and never fails; with no receivers the event is dropped.
//! - One shared ring buffer; receivers that fall behind get `RecvError::Lagged(n)`.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn receivers_see_events_published_after_subscribe() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::RunStarting));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::ModuleStarting).with_module("core"));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::ModuleStarting);
        assert_eq!(ev.module.as_deref(), Some("core"));
    }
}
