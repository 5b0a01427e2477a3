//! # Subscriber extension point.
//!
//! Implement [`Subscribe`] to observe an orchestrator: log lines, metrics, a
//! readiness probe that flips on `RunCompleted`, an alert on `StopFailed`.
//! Subscribers only observe; nothing they do can change an activation run.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use async_trait::async_trait;
//! use modvisor::{Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct Readiness(AtomicBool);
//!
//! #[async_trait]
//! impl Subscribe for Readiness {
//!     async fn on_event(&self, ev: &Event) {
//!         match ev.kind {
//!             EventKind::RunCompleted => self.0.store(true, Ordering::Release),
//!             EventKind::RunAborted | EventKind::ShutdownRequested => {
//!                 self.0.store(false, Ordering::Release)
//!             }
//!             _ => {}
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "readiness" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Observer of orchestration events.
///
/// Runs on its own worker with a bounded queue (see
/// [`SubscriberSet`](crate::SubscriberSet)); a slow `on_event` only delays this
/// subscriber, and a panic is caught and reported as `SubscriberPanicked`.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event. Events arrive in publish order.
    async fn on_event(&self, event: &Event);

    /// Name used in overflow and panic reports. Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue size for this subscriber (at least 1). Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
