//! # modvisor
//!
//! **Modvisor** activates a catalog of runtime modules in dependency order and
//! releases them in exact reverse order.
//!
//! A host application declares a set of modules, each with a name and a list of
//! dependency names. The orchestrator starts a fixed essential prefix one by one,
//! then starts every other requested module concurrently, as soon as all of its
//! dependencies are started. Any start failure aborts the whole run.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   Catalog (frozen)            requested names + essential configs
//!   [core, config, logging | A, B, C, ...]          │
//!            │                                      ▼
//! ┌──────────┴────────────────────────────────────────────────────────┐
//! │  Orchestrator                                                     │
//! │  - ActivationState (started / installing / start order)           │
//! │  - Exports (objects published by started modules)                 │
//! │  - Bus (broadcast events)                                         │
//! └──────┬──────────────────────────┬─────────────────────────────────┘
//!        ▼                          ▼
//!  essential bootstrap        Round scheduler ─────► WorkerPool (N slots)
//!  core → config → logging    pass: eligible = deps prefix-matched by started
//!  (one at a time)            start job done → new pass (wavefront)
//!        │                          │
//!        └──────── publish ─────────┴──► Bus ──► listener ──► SubscriberSet
//!                                                              ├─► LogWriter
//!                                                              └─► custom
//! ```
//!
//! ### Lifecycle
//! ```text
//! start(requested, configs)
//!   ├─► validate names (UnknownModuleRequested, nothing touched)
//!   ├─► essentials, sequential          ─ fail ─► EssentialStartFailure
//!   ├─► wavefront over the DAG          ─ fail ─► ModuleStartFailure
//!   │                                   ─ stuck ─► DeadlockStall
//!   └─► every requested module started  ─► Ok, is_running() = true
//!
//! stop()
//!   └─► stop() each started module in reverse start order, best effort
//! ```
//!
//! A failed run is sticky: the same orchestrator refuses every later `start`.
//!
//! ## Dependency names are prefixes
//! A dependency on `jdbc` is satisfied by any started module whose name starts
//! with `jdbc`, such as `jdbc-postgres`.
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                      |
//! |-------------------|--------------------------------------------------------------|-----------------------------------------|
//! | **Modules**       | Activatable units and a closure-backed implementation.       | [`Module`], [`ModuleFn`], [`ModuleRef`] |
//! | **Catalog**       | Frozen module set with an essential prefix.                  | [`Catalog`], [`ModuleProvider`]         |
//! | **Orchestration** | Activation, reverse shutdown, signal-driven `serve`.         | [`Orchestrator`]                        |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, readiness).     | [`Subscribe`], [`LogWriter`]            |
//! | **Errors**        | Typed errors for activation, modules and shutdown.           | [`ActivationError`], [`ShutdownError`]  |
//! | **Configuration** | Pool size, timeouts, bus capacity.                           | [`OrchestratorConfig`]                  |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use modvisor::{
//!     Catalog, EssentialConfigs, LogWriter, ModuleFn, Orchestrator, OrchestratorConfig,
//!     StartContext, Subscribe,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Catalog::builder()
//!         .essential(ModuleFn::new("core", |ctx: StartContext| async move {
//!             let dir = ctx.config_as::<String>();
//!             assert_eq!(dir.as_deref().map(String::as_str), Some("/var/lib/app"));
//!             Ok(())
//!         }).into_ref())
//!         .module(ModuleFn::new("jdbc-postgres", |_ctx: StartContext| async { Ok(()) })
//!             .into_ref())
//!         .module(ModuleFn::new("web", |_ctx: StartContext| async { Ok(()) })
//!             .depends_on(["core", "jdbc"])
//!             .into_ref())
//!         .build()?;
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let orch = Orchestrator::builder(catalog)
//!         .with_config(OrchestratorConfig::default())
//!         .with_subscribers(subs)
//!         .build();
//!
//!     let mut configs = EssentialConfigs::new();
//!     configs.insert("core".into(), Arc::new(String::from("/var/lib/app")));
//!
//!     orch.start(&["web", "jdbc-postgres"], configs).await?;
//!     assert_eq!(orch.started_order(), vec!["core", "jdbc-postgres", "web"]);
//!
//!     orch.stop().await?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod modules;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{
    DEFAULT_POOL_SIZE, EssentialConfigs, Orchestrator, OrchestratorBuilder, OrchestratorConfig,
};
pub use error::{ActivationError, ModuleError, RuntimeError, ShutdownError, StopFailure};
pub use events::{Bus, Event, EventKind};
pub use modules::{
    Catalog, CatalogBuilder, Exports, Module, ModuleConfig, ModuleDescriptor, ModuleFn,
    ModuleProvider, ModuleRef, StartContext,
};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
