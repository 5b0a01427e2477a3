//! # Shutdown sequencer.
//!
//! Stops started modules in **exact reverse** of their recorded start order,
//! one at a time. A failing `stop()` is reported and recorded but never
//! interrupts the sweep: every module gets its `stop()` call.
//!
//! ```text
//! started: [core, config, logging, A, B, C]
//! stop:     C → B → A → logging → config → core
//!           │
//!           └─ Err/timeout/panic → StopFailure, continue
//!
//! after the sweep:
//!   failures = ∅  → ShutdownCompleted, Ok(())
//!   failures ≠ ∅  → ShutdownCompleted{count}, Err(ShutdownError)
//! ```

use std::time::Duration;

use tracing::warn;

use crate::{
    core::{runner, state::StartedModule},
    error::{ShutdownError, StopFailure},
    events::{Bus, Event, EventKind},
};

/// Stops `started` in reverse order and accumulates failures.
pub(crate) async fn stop_all(
    started: Vec<StartedModule>,
    timeout: Option<Duration>,
    bus: &Bus,
) -> Result<(), ShutdownError> {
    let total = started.len();
    let mut failures = Vec::new();

    for entry in started.into_iter().rev() {
        if let Err(error) = runner::stop_once(entry.module.as_ref(), timeout, bus).await {
            warn!(module = %entry.name, %error, "module failed to stop");
            failures.push(StopFailure {
                module: entry.name.to_string(),
                error,
            });
        }
    }

    let mut done = Event::new(EventKind::ShutdownCompleted).with_count(total);
    if !failures.is_empty() {
        done = done.with_reason(format!("{} stop failure(s)", failures.len()));
    }
    bus.publish(done);

    if failures.is_empty() {
        Ok(())
    } else {
        Err(ShutdownError { failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModuleError;
    use crate::modules::{ModuleFn, StartContext};
    use std::sync::{Arc, Mutex};

    fn started(
        name: &'static str,
        journal: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    ) -> StartedModule {
        let module = ModuleFn::new(name, |_ctx: StartContext| async { Ok(()) })
            .with_stop(move || {
                let journal = journal.clone();
                async move {
                    journal.lock().unwrap().push(name);
                    if fail {
                        Err(ModuleError::fail("busy"))
                    } else {
                        Ok(())
                    }
                }
            })
            .into_ref();
        StartedModule {
            name: Arc::from(name),
            module,
        }
    }

    #[tokio::test]
    async fn stops_in_reverse_and_keeps_going() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let list = vec![
            started("core", journal.clone(), false),
            started("config", journal.clone(), true),
            started("web", journal.clone(), false),
        ];

        let err = stop_all(list, None, &Bus::new(16)).await.unwrap_err();

        assert_eq!(*journal.lock().unwrap(), vec!["web", "config", "core"]);
        assert_eq!(err.modules(), vec!["config"]);
    }

    #[tokio::test]
    async fn empty_sweep_is_ok() {
        let bus = Bus::new(4);
        let mut rx = bus.subscribe();
        assert!(stop_all(Vec::new(), None, &bus).await.is_ok());
        assert_eq!(rx.try_recv().unwrap().kind, EventKind::ShutdownCompleted);
    }
}
