//! # Orchestration events.
//!
//! An [`Event`] is one observable step of an activation run or of a shutdown
//! sweep. [`EventKind`] says which step; the optional fields carry the details
//! that kind needs (the module, a failure reason, a batch size, a timeout).
//!
//! Events from concurrent passes can reach a subscriber in any interleaving;
//! `seq` is process-wide and strictly increasing, so sorting by it recovers
//! the publish order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use modvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::StartTimeout)
//!     .with_module("jdbc-postgres")
//!     .with_timeout(Duration::from_secs(30));
//!
//! assert_eq!(ev.kind, EventKind::StartTimeout);
//! assert_eq!(ev.module.as_deref(), Some("jdbc-postgres"));
//! assert_eq!(ev.timeout_ms, Some(30_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

/// What happened.
///
/// The field notes list what each kind fills in; everything else is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Validation passed and the run begins. `count`: requested non-essential modules.
    RunStarting,
    /// A pass moved a batch of eligible modules to installing. `count`: batch size.
    PassDispatched,
    /// Every requested module is started. `count`: modules started in total.
    RunCompleted,
    /// The run failed. `reason`: the error; `module`: the failed module, if one.
    RunAborted,
    /// Nothing eligible, nothing in flight, requests still pending. `reason`: pending names.
    DeadlockDetected,

    /// `start()` is about to run. `module`.
    ModuleStarting,
    /// `start()` succeeded. `module`.
    ModuleStarted,
    /// `start()` returned an error, timed out or panicked. `module`, `reason`.
    ModuleFailed,
    /// `start()` ran past the start timeout; `ModuleFailed` follows. `module`, `timeout_ms`.
    StartTimeout,

    /// `serve` saw a termination signal or its token was cancelled.
    ShutdownRequested,
    /// `stop()` is about to run. `module`.
    ModuleStopping,
    /// `stop()` succeeded. `module`.
    ModuleStopped,
    /// `stop()` failed; the sweep goes on. `module`, `reason`.
    StopFailed,
    /// The reverse sweep is over. `count`: modules swept; `reason`: set if any stop failed.
    ShutdownCompleted,

    /// A subscriber's queue was full or closed; it missed one event.
    /// `module`: subscriber, `reason`.
    SubscriberOverflow,
    /// A subscriber panicked in `on_event`. `module`: subscriber, `reason`: panic message.
    SubscriberPanicked,
}

/// One published event.
#[derive(Clone, Debug)]
pub struct Event {
    /// Process-wide publish order.
    pub seq: u64,
    /// When the event was built.
    pub at: SystemTime,
    pub kind: EventKind,
    /// Module (or subscriber) the event is about.
    pub module: Option<Arc<str>>,
    /// Failure message, pending names or overflow details.
    pub reason: Option<Arc<str>>,
    /// Batch size or module count.
    pub count: Option<u32>,
    /// Timeout in milliseconds, saturated at `u32::MAX`.
    pub timeout_ms: Option<u32>,
}

impl Event {
    /// Event of `kind`, stamped with the next sequence number and the current time.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: NEXT_SEQ.fetch_add(1, Ordering::Relaxed),
            at: SystemTime::now(),
            kind,
            module: None,
            reason: None,
            count: None,
            timeout_ms: None,
        }
    }

    #[inline]
    pub fn with_module(mut self, module: impl Into<Arc<str>>) -> Self {
        self.module = Some(module.into());
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Sets `count`, saturating at `u32::MAX`.
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(u32::try_from(n).unwrap_or(u32::MAX));
        self
    }

    /// Sets `timeout_ms`, saturating at `u32::MAX`.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX));
        self
    }

    pub(crate) fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_module(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    pub(crate) fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_module(subscriber)
            .with_reason(info)
    }

    /// True for [`EventKind::SubscriberOverflow`].
    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        self.kind == EventKind::SubscriberOverflow
    }
}
