//! Runtime core: activation and shutdown.
//!
//! The public API from this module is [`Orchestrator`] (with its builder and
//! config). Everything else is internal:
//! - [`essential`]: sequential bootstrap of the catalog's essential prefix;
//! - [`scheduler`]: the round scheduler, a wavefront over the dependency DAG;
//! - [`state`]: started/installing bookkeeping behind one lock;
//! - [`pool`]: semaphore-bounded worker pool shared by passes and starts;
//! - [`signal`]: one-shot completion signal per run;
//! - [`runner`]: one guarded `start()`/`stop()` call with event publishing;
//! - [`shutdown`]: reverse-order stop sweep;
//! - [`signals`]: OS termination signals for `serve`.

mod builder;
mod config;
mod essential;
mod orchestrator;
mod pool;
mod runner;
mod scheduler;
mod shutdown;
mod signal;
mod signals;
mod state;

pub use builder::OrchestratorBuilder;
pub use config::{DEFAULT_POOL_SIZE, OrchestratorConfig};
pub use essential::EssentialConfigs;
pub use orchestrator::Orchestrator;
