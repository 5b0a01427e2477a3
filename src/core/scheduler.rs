//! # Round scheduler: wavefront activation over the dependency DAG.
//!
//! A [`Round`] owns everything one activation run needs and drives it through
//! overlapping scheduling passes. A pass is itself a unit of work on the
//! [`WorkerPool`], and every successful start submits a fresh pass, so a module
//! starts the moment its last dependency completes instead of waiting for the
//! rest of its batch.
//!
//! ## One pass
//! ```text
//! lock state
//!   eligible = requested − started − installing, all deps prefix-matched by started
//!   installing += eligible
//! unlock
//!   ├─ eligible ≠ ∅                         → submit start job per module
//!   ├─ eligible = ∅, in flight > 0          → return (a completion re-triggers)
//!   ├─ eligible = ∅, all started, idle      → release signal Ok(())
//!   └─ eligible = ∅, not all started, idle  → release signal Err(DeadlockStall)
//! ```
//!
//! ## One start job
//! ```text
//! aborted? ──yes──► abandon install (never began)
//!    │no
//! start_once() ──Ok──►  lock: installing → started, record order; submit pass
//!              └─Err─►  abort run (ModuleStartFailure); lock: abandon install
//! ```
//!
//! ## Rules
//! - The state lock is held only for eligibility and bookkeeping, never across `start()`.
//! - After the first failure no new pass dispatches and queued start jobs are skipped;
//!   jobs already inside `start()` finish and, if they succeed, are still recorded so
//!   that shutdown releases them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::{
    core::{pool::WorkerPool, runner, signal::CompletionSignal, state::ActivationState},
    error::ActivationError,
    events::{Bus, Event, EventKind},
    modules::{Catalog, CatalogEntry, Exports, StartContext},
};

/// Decision taken by one pass while holding the lock.
enum Plan {
    Dispatch(Vec<usize>),
    Wait,
    Complete(usize),
    Stalled(Vec<String>),
}

/// One activation run of the concurrent phase.
pub(crate) struct Round {
    catalog: Catalog,
    requested: Vec<usize>,
    state: Arc<Mutex<ActivationState>>,
    pool: WorkerPool,
    signal: CompletionSignal,
    bus: Bus,
    exports: Exports,
    start_timeout: Option<Duration>,
    aborted: AtomicBool,
}

/// Shared handles a [`Round`] is built from.
pub(crate) struct RunParts {
    pub(crate) catalog: Catalog,
    pub(crate) state: Arc<Mutex<ActivationState>>,
    pub(crate) pool: WorkerPool,
    pub(crate) bus: Bus,
    pub(crate) exports: Exports,
    pub(crate) start_timeout: Option<Duration>,
}

impl Round {
    pub(crate) fn new(parts: RunParts, requested: Vec<usize>) -> Arc<Self> {
        Arc::new(Self {
            catalog: parts.catalog,
            requested,
            state: parts.state,
            pool: parts.pool,
            signal: CompletionSignal::new(),
            bus: parts.bus,
            exports: parts.exports,
            start_timeout: parts.start_timeout,
            aborted: AtomicBool::new(false),
        })
    }

    /// Submits the first pass and waits for the run's outcome.
    ///
    /// Returns once the signal is released; stragglers are drained by the caller.
    pub(crate) async fn run(self: &Arc<Self>) -> Result<(), ActivationError> {
        self.submit_pass();
        self.signal.wait().await
    }

    fn lock_state(&self) -> MutexGuard<'_, ActivationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    fn submit_pass(self: &Arc<Self>) {
        let me = Arc::clone(self);
        self.pool.submit(async move { me.pass() });
    }

    /// One scheduling pass.
    fn pass(self: &Arc<Self>) {
        if self.is_aborted() || self.signal.is_released() {
            return;
        }

        match self.plan() {
            Plan::Wait => {}
            Plan::Complete(started) => {
                if self.signal.release(Ok(())) {
                    debug!(started, "all requested modules started");
                    self.bus
                        .publish(Event::new(EventKind::RunCompleted).with_count(started));
                }
            }
            Plan::Stalled(pending) => {
                self.bus.publish(
                    Event::new(EventKind::DeadlockDetected).with_reason(pending.join(",")),
                );
                self.abort(ActivationError::DeadlockStall { pending });
            }
            Plan::Dispatch(batch) => {
                debug!(batch = batch.len(), "dispatching eligible modules");
                self.bus
                    .publish(Event::new(EventKind::PassDispatched).with_count(batch.len()));
                for idx in batch {
                    let me = Arc::clone(self);
                    self.pool.submit(async move { me.start_job(idx).await });
                }
            }
        }
    }

    /// Computes the eligible set and moves it to installing, under the lock.
    fn plan(&self) -> Plan {
        let mut st = self.lock_state();

        let eligible: Vec<usize> = self
            .requested
            .iter()
            .copied()
            .filter(|&idx| {
                let d = &self.catalog.entry(idx).descriptor;
                !st.is_started(d.name())
                    && !st.is_installing(d.name())
                    && d.is_satisfied_by(st.started_names())
            })
            .collect();

        if !eligible.is_empty() {
            for &idx in &eligible {
                st.begin_install(&self.catalog.entry(idx).descriptor.shared_name());
            }
            return Plan::Dispatch(eligible);
        }

        if st.in_flight() > 0 {
            return Plan::Wait;
        }

        let pending: Vec<String> = self
            .requested
            .iter()
            .map(|&idx| self.catalog.entry(idx).descriptor.name())
            .filter(|name| !st.is_started(name))
            .map(str::to_string)
            .collect();

        if pending.is_empty() {
            Plan::Complete(st.started_order().len())
        } else {
            Plan::Stalled(pending)
        }
    }

    async fn start_job(self: Arc<Self>, idx: usize) {
        let entry = self.catalog.entry(idx);
        let name = entry.descriptor.shared_name();

        if self.is_aborted() {
            self.lock_state().abandon_install(&name);
            return;
        }

        let ctx = self.context_for(entry);
        let res =
            runner::start_once(entry.module.as_ref(), ctx, self.start_timeout, &self.bus).await;

        match res {
            Ok(()) => {
                self.lock_state()
                    .finish_install(&name, Arc::clone(&entry.module));
                if !self.is_aborted() {
                    self.submit_pass();
                }
            }
            Err(error) => {
                // Abort while still counted as in flight, so no pass can report a stall first.
                self.abort(ActivationError::ModuleStartFailure {
                    module: name.to_string(),
                    error,
                });
                self.lock_state().abandon_install(&name);
            }
        }
    }

    /// Non-essential modules get the first export whose type they accept.
    fn context_for(&self, entry: &CatalogEntry) -> StartContext {
        let module = &entry.module;
        let config = self.exports.find(|ty| module.accepts_config(ty));
        StartContext::new(config, self.exports.clone())
    }

    /// Stops further scheduling and releases the signal with `err` (first failure wins).
    fn abort(&self, err: ActivationError) {
        if self.aborted.swap(true, Ordering::AcqRel) {
            return;
        }
        let module = match &err {
            ActivationError::ModuleStartFailure { module, .. } => Some(module.clone()),
            _ => None,
        };
        tracing::warn!(error = %err, "activation run aborted");

        let mut ev = Event::new(EventKind::RunAborted).with_reason(err.to_string());
        if let Some(module) = module {
            ev = ev.with_module(module);
        }
        self.bus.publish(ev);
        self.signal.release(Err(err));
    }
}
