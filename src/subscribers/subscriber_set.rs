//! # Subscriber fan-out.
//!
//! [`SubscriberSet`] hands every orchestration event to each subscriber through
//! that subscriber's own bounded lane, so a slow or broken subscriber never
//! holds back a scheduling pass or another subscriber.
//!
//! ```text
//! emit(event) ─┬─ try_send ─► lane "log"     ─► deliver() ─► LogWriter::on_event
//!              ├─ try_send ─► lane "metrics" ─► deliver() ─► Metrics::on_event
//!              └─ lane full/closed ─► SubscriberOverflow on the bus (event dropped for that lane)
//!
//! deliver(): on_event panics ─► SubscriberPanicked on the bus, lane keeps running
//! ```
//!
//! Each lane is FIFO; lanes are not ordered relative to each other.
//! Panics are caught with `AssertUnwindSafe`, so a subscriber that panics while
//! holding its own lock may leave that state poisoned.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinSet;

use crate::error::panic_info;
use crate::events::{Bus, Event};
use crate::subscribers::Subscribe;

type Lane = mpsc::Sender<Arc<Event>>;

/// Set of subscribers, each served by a dedicated worker.
pub struct SubscriberSet {
    lanes: Vec<(&'static str, Lane)>,
    workers: JoinSet<()>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber. Must run inside a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut lanes = Vec::with_capacity(subs.len());
        let mut workers = JoinSet::new();

        for sub in subs {
            let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
            lanes.push((sub.name(), tx));
            workers.spawn(deliver(sub, rx, bus.clone()));
        }
        Self {
            lanes,
            workers,
            bus,
        }
    }

    /// Queues `event` on every lane without waiting.
    pub fn emit(&self, event: Event) {
        let overflow_itself = event.is_subscriber_overflow();
        let event = Arc::new(event);

        for (name, lane) in &self.lanes {
            let reason = match lane.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(TrySendError::Full(_)) => "full",
                Err(TrySendError::Closed(_)) => "closed",
            };
            // Overflow reports are not re-reported, or a stuck lane would loop.
            if !overflow_itself {
                self.bus.publish(Event::subscriber_overflow(*name, reason));
            }
        }
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Closes every lane and waits until the workers have delivered what was queued.
    pub async fn shutdown(mut self) {
        self.lanes.clear();
        while self.workers.join_next().await.is_some() {}
    }
}

async fn deliver(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        let outcome = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await;
        if let Err(payload) = outcome {
            let info = panic_info(&*payload);
            tracing::warn!(subscriber = sub.name(), %info, "subscriber panicked");
            bus.publish(Event::subscriber_panicked(sub.name(), info));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Collect(Arc<Mutex<Vec<EventKind>>>);

    #[async_trait]
    impl Subscribe for Collect {
        async fn on_event(&self, event: &Event) {
            self.0.lock().unwrap().push(event.kind);
        }
        fn name(&self) -> &'static str {
            "collect"
        }
    }

    struct Panicky;

    #[async_trait]
    impl Subscribe for Panicky {
        async fn on_event(&self, _event: &Event) {
            panic!("subscriber exploded");
        }
        fn name(&self) -> &'static str {
            "panicky"
        }
    }

    /// Never drains its single-slot lane.
    struct Stuck;

    #[async_trait]
    impl Subscribe for Stuck {
        async fn on_event(&self, _event: &Event) {
            std::future::pending::<()>().await;
        }
        fn name(&self) -> &'static str {
            "stuck"
        }
        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn delivers_in_fifo_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let set = SubscriberSet::new(vec![Arc::new(Collect(seen.clone()))], Bus::new(16));
        assert_eq!(set.len(), 1);

        set.emit(Event::new(EventKind::ModuleStarting));
        set.emit(Event::new(EventKind::ModuleStarted));
        set.shutdown().await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![EventKind::ModuleStarting, EventKind::ModuleStarted]
        );
    }

    #[tokio::test]
    async fn panics_are_reported_on_the_bus() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Panicky)], bus.clone());

        set.emit(Event::new(EventKind::RunStarting));
        set.shutdown().await;

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.module.as_deref(), Some("panicky"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber exploded"));
    }

    #[tokio::test]
    async fn full_lane_reports_overflow() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Stuck)], bus.clone());

        for _ in 0..4 {
            set.emit(Event::new(EventKind::PassDispatched));
        }

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.module.as_deref(), Some("stuck"));
    }
}
