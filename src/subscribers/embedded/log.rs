//! # LogWriter: events rendered through `tracing`
//!
//! A subscriber that turns every incoming [`Event`] into one structured
//! `tracing` record. Install any `tracing` subscriber (e.g. `tracing-subscriber`
//! with `RUST_LOG`) to see the output.
//!
//! ## Example output (fmt layer)
//! ```text
//! INFO modvisor: module starting module="core"
//! INFO modvisor: module started module="core"
//! DEBUG modvisor: pass dispatched batch=2
//! ERROR modvisor: module failed module="web" reason="execution failed: port in use"
//! WARN modvisor: run aborted module="web" reason="..."
//! INFO modvisor: module stopped module="core"
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Writes every event as one `tracing` record; failures at `warn`/`error`, passes at `debug`.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let module = e.module.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::RunStarting => info!(requested = ?e.count, "run starting"),
            EventKind::PassDispatched => debug!(batch = ?e.count, "pass dispatched"),
            EventKind::RunCompleted => info!(started = ?e.count, "run completed"),
            EventKind::RunAborted => warn!(module, reason, "run aborted"),
            EventKind::DeadlockDetected => error!(pending = reason, "activation stalled"),
            EventKind::ModuleStarting => info!(module, "module starting"),
            EventKind::ModuleStarted => info!(module, "module started"),
            EventKind::ModuleFailed => error!(module, reason, "module failed"),
            EventKind::StartTimeout => {
                warn!(module, timeout_ms = ?e.timeout_ms, "module start timed out")
            }
            EventKind::ShutdownRequested => info!("shutdown requested"),
            EventKind::ModuleStopping => debug!(module, "module stopping"),
            EventKind::ModuleStopped => info!(module, "module stopped"),
            EventKind::StopFailed => warn!(module, reason, "module failed to stop"),
            EventKind::ShutdownCompleted => {
                info!(swept = ?e.count, failures = reason, "shutdown completed")
            }
            EventKind::SubscriberOverflow => {
                warn!(subscriber = module, reason, "subscriber overflow")
            }
            EventKind::SubscriberPanicked => {
                error!(subscriber = module, reason, "subscriber panicked")
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
