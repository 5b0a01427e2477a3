//! # Orchestrator: validates, activates and releases a catalog of modules.
//!
//! The [`Orchestrator`] owns the frozen [`Catalog`], the activation bookkeeping,
//! the [`Exports`] registry and the event [`Bus`]. It is an explicit instance
//! owned by the host's startup routine and handed to whatever needs to trigger
//! activation or shutdown.
//!
//! ## Activation run
//! ```text
//! start(requested, essential_configs)
//!   ├─ failed?                 → Err(RunFailed)          (sticky, nothing touched)
//!   ├─ modules still started?  → Err(AlreadyRunning)
//!   ├─ resolve(requested)      → Err(UnknownModuleRequested) (nothing touched)
//!   ├─ publish RunStarting
//!   ├─ fresh WorkerPool(pool_size)
//!   ├─ essential bootstrap     (sequential, config injected by name)
//!   │     └─ Err → EssentialStartFailure
//!   ├─ Round::run()            (wavefront over the dependency DAG)
//!   │     └─ Err → ModuleStartFailure | DeadlockStall
//!   ├─ pool.drain()            (stragglers finish; successes stay recorded)
//!   └─ Ok → running = true  |  sticky Err → failed = true
//! ```
//!
//! ## Shutdown
//! ```text
//! stop()
//!   ├─ take started modules (clears started + installing)
//!   ├─ reverse sweep, one at a time, failures accumulated
//!   └─ clear exports; `failed` is left untouched
//! ```
//!
//! `start` and `stop` are serialized by one async lifecycle lock; the state lock
//! used by scheduling passes is a separate `std::sync::Mutex`.
//!
//! ## Example
//! ```rust
//! use modvisor::{Catalog, EssentialConfigs, ModuleFn, Orchestrator, OrchestratorConfig, StartContext};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::builder()
//!     .essential(ModuleFn::new("core", |_ctx: StartContext| async { Ok(()) }).into_ref())
//!     .module(
//!         ModuleFn::new("web", |_ctx: StartContext| async { Ok(()) })
//!             .depends_on(["core"])
//!             .into_ref(),
//!     )
//!     .build()?;
//!
//! let orch = Orchestrator::new(catalog, OrchestratorConfig::default());
//! orch.start(&["web"], EssentialConfigs::new()).await?;
//! assert_eq!(orch.started_order(), vec!["core", "web"]);
//!
//! orch.stop().await?;
//! assert!(!orch.is_running());
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    core::{
        builder::OrchestratorBuilder,
        config::OrchestratorConfig,
        essential::{self, EssentialConfigs},
        pool::WorkerPool,
        scheduler::{Round, RunParts},
        shutdown, signals,
        state::ActivationState,
    },
    error::{ActivationError, RuntimeError, ShutdownError},
    events::{Bus, Event, EventKind},
    modules::{Catalog, Exports},
};

/// Activates requested modules in dependency order and releases them in reverse.
pub struct Orchestrator {
    catalog: Catalog,
    cfg: OrchestratorConfig,
    bus: Bus,
    state: Arc<Mutex<ActivationState>>,
    exports: Exports,
    failed: AtomicBool,
    running: AtomicBool,
    lifecycle: AsyncMutex<()>,
    /// Cancelled on drop; ends the builder's subscriber listener.
    runtime_token: CancellationToken,
}

impl Orchestrator {
    /// Creates an orchestrator without subscribers.
    ///
    /// Events are still published; use [`subscribe`](Self::subscribe) or the
    /// [`builder`](Self::builder) to observe them.
    pub fn new(catalog: Catalog, cfg: OrchestratorConfig) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self::with_bus(catalog, cfg, bus)
    }

    /// Returns a builder for wiring config and subscribers.
    pub fn builder(catalog: Catalog) -> OrchestratorBuilder {
        OrchestratorBuilder::new(catalog)
    }

    pub(crate) fn with_bus(catalog: Catalog, cfg: OrchestratorConfig, bus: Bus) -> Self {
        Self {
            catalog,
            cfg,
            bus,
            state: Arc::new(Mutex::new(ActivationState::default())),
            exports: Exports::new(),
            failed: AtomicBool::new(false),
            running: AtomicBool::new(false),
            lifecycle: AsyncMutex::new(()),
            runtime_token: CancellationToken::new(),
        }
    }

    pub(crate) fn runtime_token(&self) -> CancellationToken {
        self.runtime_token.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, ActivationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs one activation: essentials first, then every requested module.
    ///
    /// Returns after every requested module is started, or with the first fatal error.
    /// On error, modules that did start stay recorded; call [`stop`](Self::stop) to release them.
    pub async fn start<S: AsRef<str>>(
        &self,
        requested: &[S],
        configs: EssentialConfigs,
    ) -> Result<(), ActivationError> {
        let _lifecycle = self.lifecycle.lock().await;

        if self.failed.load(Ordering::Acquire) {
            return Err(ActivationError::RunFailed);
        }
        if self.running.load(Ordering::Acquire) || !self.lock_state().is_empty() {
            return Err(ActivationError::AlreadyRunning);
        }
        let requested = self.catalog.resolve(requested)?;

        info!(requested = requested.len(), "activation run starting");
        self.bus
            .publish(Event::new(EventKind::RunStarting).with_count(requested.len()));

        let parts = RunParts {
            catalog: self.catalog.clone(),
            state: Arc::clone(&self.state),
            pool: WorkerPool::new(self.cfg.pool_size_clamped()),
            bus: self.bus.clone(),
            exports: self.exports.clone(),
            start_timeout: self.cfg.start_timeout(),
        };

        match self.activate(parts, requested, &configs).await {
            Ok(()) => {
                self.running.store(true, Ordering::Release);
                let started = self.lock_state().started_order().len();
                info!(started, "activation run completed");
                Ok(())
            }
            Err(err) => {
                if err.is_sticky() {
                    self.failed.store(true, Ordering::Release);
                }
                warn!(error = %err, label = err.as_label(), "activation run failed");
                Err(err)
            }
        }
    }

    async fn activate(
        &self,
        parts: RunParts,
        requested: Vec<usize>,
        configs: &EssentialConfigs,
    ) -> Result<(), ActivationError> {
        let pool = parts.pool.clone();

        let outcome = match essential::bootstrap(&parts, configs).await {
            Ok(()) => Round::new(parts, requested).run().await,
            Err(err) => {
                let mut ev = Event::new(EventKind::RunAborted).with_reason(err.to_string());
                if let ActivationError::EssentialStartFailure { module, .. } = &err {
                    ev = ev.with_module(module.as_str());
                }
                self.bus.publish(ev);
                Err(err)
            }
        };

        pool.drain().await;
        outcome
    }

    /// Stops every started module in reverse start order.
    ///
    /// A no-op when nothing is started. Every module gets its `stop()` call even if
    /// earlier ones fail; failures come back together once the sweep is over.
    pub async fn stop(&self) -> Result<(), ShutdownError> {
        let _lifecycle = self.lifecycle.lock().await;

        let started = self.lock_state().take_started();
        self.running.store(false, Ordering::Release);
        if started.is_empty() {
            return Ok(());
        }

        info!(modules = started.len(), "stopping modules");
        let res = shutdown::stop_all(started, self.cfg.stop_timeout(), &self.bus).await;
        self.exports.clear();
        res
    }

    /// Starts the requested modules, waits for a termination signal or `token`, then stops.
    ///
    /// A failed activation releases whatever did start before returning the activation error.
    pub async fn serve<S: AsRef<str>>(
        &self,
        requested: &[S],
        configs: EssentialConfigs,
        token: CancellationToken,
    ) -> Result<(), RuntimeError> {
        if let Err(err) = self.start(requested, configs).await {
            if self.has_partial_run(&err) {
                if let Err(stop_err) = self.stop().await {
                    warn!(error = %stop_err, "release after failed activation incomplete");
                }
            }
            return Err(err.into());
        }

        let signal = tokio::select! {
            res = signals::wait_for_shutdown_signal() => res,
            _ = token.cancelled() => Ok(()),
        };
        self.bus.publish(Event::new(EventKind::ShutdownRequested));

        let stopped = self.stop().await;
        signal?;
        stopped?;
        Ok(())
    }

    /// Whether `err` came out of this call's own run (and may have left modules started).
    fn has_partial_run(&self, err: &ActivationError) -> bool {
        matches!(
            err,
            ActivationError::EssentialStartFailure { .. }
                | ActivationError::ModuleStartFailure { .. }
                | ActivationError::DeadlockStall { .. }
        )
    }

    /// True after a successful [`start`](Self::start) and until [`stop`](Self::stop).
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// True once any run has failed; never resets for this instance.
    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    /// Names of started modules in the order their starts completed.
    pub fn started_order(&self) -> Vec<String> {
        self.lock_state().started_order()
    }

    /// New receiver on the event bus.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Objects published by started modules.
    pub fn exports(&self) -> &Exports {
        &self.exports
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.cfg
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.runtime_token.cancel();
    }
}
