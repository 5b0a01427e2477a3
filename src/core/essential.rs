//! # Essential bootstrap.
//!
//! Starts the catalog's essential prefix strictly in catalog order before any
//! concurrent scheduling begins. Each start runs on a worker-pool slot but is
//! awaited individually, so essential `k + 1` never starts before essential `k`
//! has completed.
//!
//! ```text
//! for essential in catalog.essential_entries():
//!     config = essential_configs[name]        (direct injection)
//!     pool.run(start_once(..)).await
//!       ├─ Ok  → record started (same order as shutdown will reverse)
//!       └─ Err → EssentialStartFailure, stop the loop
//! ```
//!
//! Essential modules are the only ones that receive configuration by name;
//! everything else discovers it through [`Exports`](crate::Exports).

use std::collections::HashMap;
use std::sync::{Arc, PoisonError};

use tracing::debug;

use crate::{
    core::{runner, scheduler::RunParts},
    error::{ActivationError, ModuleError},
    modules::{CatalogEntry, ModuleConfig, StartContext},
};

/// Configuration values for essential modules, keyed by module name.
pub type EssentialConfigs = HashMap<String, ModuleConfig>;

/// Starts every essential module in order, stopping at the first failure.
pub(crate) async fn bootstrap(
    parts: &RunParts,
    configs: &EssentialConfigs,
) -> Result<(), ActivationError> {
    for entry in parts.catalog.essential_entries() {
        let name = entry.descriptor.shared_name();
        debug_assert!(
            !parts
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_started(&name),
            "bootstrap runs only on an empty activation state"
        );

        let config = configs.get(name.as_ref()).cloned();
        start_essential(parts, entry, config)
            .await
            .map_err(|error| ActivationError::EssentialStartFailure {
                module: name.to_string(),
                error,
            })?;

        parts
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record_started(&name, Arc::clone(&entry.module));
        debug!(module = %name, "essential module started");
    }
    Ok(())
}

/// Runs one essential `start()` on a pool slot and waits for it.
async fn start_essential(
    parts: &RunParts,
    entry: &CatalogEntry,
    config: Option<ModuleConfig>,
) -> Result<(), ModuleError> {
    let module = Arc::clone(&entry.module);
    let ctx = StartContext::new(config, parts.exports.clone());
    let timeout = parts.start_timeout;
    let bus = parts.bus.clone();

    parts
        .pool
        .run(async move { runner::start_once(module.as_ref(), ctx, timeout, &bus).await })
        .await
        .unwrap_or_else(|join_err| {
            Err(ModuleError::Panicked {
                info: join_err.to_string(),
            })
        })
}
