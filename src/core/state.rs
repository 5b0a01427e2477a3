//! # Activation bookkeeping.
//!
//! [`ActivationState`] records which modules are started, which are installing
//! (submitted but not yet completed), and the exact order in which starts
//! completed. It lives behind one `std::sync::Mutex` owned by the orchestrator;
//! the lock is only held for bookkeeping, never across a module call.
//!
//! ## Invariants
//! - A name is never both started and installing.
//! - A name enters installing at most once per run.
//! - `started_modules.len() == started_names.len()`.

use std::collections::HashSet;
use std::sync::Arc;

use crate::modules::ModuleRef;

/// A started module, in completion order.
#[derive(Clone)]
pub(crate) struct StartedModule {
    pub(crate) name: Arc<str>,
    pub(crate) module: ModuleRef,
}

#[derive(Default)]
pub(crate) struct ActivationState {
    started_names: HashSet<Arc<str>>,
    installing: HashSet<Arc<str>>,
    started_modules: Vec<StartedModule>,
}

impl ActivationState {
    pub(crate) fn is_started(&self, name: &str) -> bool {
        self.started_names.contains(name)
    }

    pub(crate) fn is_installing(&self, name: &str) -> bool {
        self.installing.contains(name)
    }

    /// Started names, for prefix matching.
    pub(crate) fn started_names(&self) -> impl Iterator<Item = &str> + Clone {
        self.started_names.iter().map(|s| &**s)
    }

    /// Number of starts submitted and not yet completed.
    pub(crate) fn in_flight(&self) -> usize {
        self.installing.len()
    }

    /// Marks `name` as installing. Returns `false` if it was already started or installing.
    pub(crate) fn begin_install(&mut self, name: &Arc<str>) -> bool {
        if self.started_names.contains(name.as_ref()) {
            return false;
        }
        self.installing.insert(Arc::clone(name))
    }

    /// Moves an installing module to started and appends it to the start order.
    pub(crate) fn finish_install(&mut self, name: &Arc<str>, module: ModuleRef) {
        self.installing.remove(name.as_ref());
        self.record_started(name, module);
    }

    /// Drops an installing module that failed or was never started.
    pub(crate) fn abandon_install(&mut self, name: &str) {
        self.installing.remove(name);
    }

    /// Appends a started module (used directly by the essential bootstrap).
    pub(crate) fn record_started(&mut self, name: &Arc<str>, module: ModuleRef) {
        if self.started_names.insert(Arc::clone(name)) {
            self.started_modules.push(StartedModule {
                name: Arc::clone(name),
                module,
            });
        }
    }

    /// Names in completion order.
    pub(crate) fn started_order(&self) -> Vec<String> {
        self.started_modules
            .iter()
            .map(|m| m.name.to_string())
            .collect()
    }

    /// True if nothing is started or installing.
    pub(crate) fn is_empty(&self) -> bool {
        self.started_modules.is_empty() && self.installing.is_empty()
    }

    /// Clears everything and hands back the started modules in start order.
    pub(crate) fn take_started(&mut self) -> Vec<StartedModule> {
        self.started_names.clear();
        self.installing.clear();
        std::mem::take(&mut self.started_modules)
    }
}
