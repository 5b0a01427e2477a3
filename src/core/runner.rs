//! # Run one `start()` or `stop()` call of a module.
//!
//! Wraps a single module call with an optional timeout and panic capture, and
//! publishes its lifecycle events to the [`Bus`].
//!
//! ## Event flow
//! ```text
//! start_once:
//!   ModuleStarting → start() → Ok       → ModuleStarted
//!                            → Err      → ModuleFailed
//!                            → timeout  → StartTimeout → ModuleFailed
//!                            → panic    → ModuleFailed
//!
//! stop_once:
//!   ModuleStopping → stop()  → Ok       → ModuleStopped
//!                            → Err/timeout/panic → StopFailed
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** terminal event per call.
//! - A timed-out call is dropped (its future is cancelled).

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::time;

use crate::{
    error::{ModuleError, panic_info},
    events::{Bus, Event, EventKind},
    modules::{Module, StartContext},
};

/// Starts `module` once, publishing lifecycle events to `bus`.
pub(crate) async fn start_once(
    module: &dyn Module,
    ctx: StartContext,
    timeout: Option<Duration>,
    bus: &Bus,
) -> Result<(), ModuleError> {
    let name = module.name();
    bus.publish(Event::new(EventKind::ModuleStarting).with_module(name));

    let res = guarded(module.start(ctx), timeout).await;
    match &res {
        Ok(()) => bus.publish(Event::new(EventKind::ModuleStarted).with_module(name)),
        Err(e) => {
            if let ModuleError::Timeout { timeout } = e {
                bus.publish(
                    Event::new(EventKind::StartTimeout)
                        .with_module(name)
                        .with_timeout(*timeout),
                );
            }
            bus.publish(
                Event::new(EventKind::ModuleFailed)
                    .with_module(name)
                    .with_reason(e.to_string()),
            );
        }
    }
    res
}

/// Stops `module` once, publishing lifecycle events to `bus`.
pub(crate) async fn stop_once(
    module: &dyn Module,
    timeout: Option<Duration>,
    bus: &Bus,
) -> Result<(), ModuleError> {
    let name = module.name();
    bus.publish(Event::new(EventKind::ModuleStopping).with_module(name));

    let res = guarded(module.stop(), timeout).await;
    match &res {
        Ok(()) => bus.publish(Event::new(EventKind::ModuleStopped).with_module(name)),
        Err(e) => bus.publish(
            Event::new(EventKind::StopFailed)
                .with_module(name)
                .with_reason(e.to_string()),
        ),
    }
    res
}

/// Applies the optional timeout and turns a panic into [`ModuleError::Panicked`].
async fn guarded<F>(fut: F, timeout: Option<Duration>) -> Result<(), ModuleError>
where
    F: Future<Output = Result<(), ModuleError>>,
{
    let fut = AssertUnwindSafe(fut).catch_unwind();
    let caught = match timeout {
        Some(dur) => match time::timeout(dur, fut).await {
            Ok(caught) => caught,
            Err(_elapsed) => return Err(ModuleError::Timeout { timeout: dur }),
        },
        None => fut.await,
    };
    caught.unwrap_or_else(|payload| {
        Err(ModuleError::Panicked {
            info: panic_info(&*payload),
        })
    })
}
