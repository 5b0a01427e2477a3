//! # Type-keyed exports registry.
//!
//! Started modules publish objects here (a parsed configuration, a connection
//! pool) so that later modules can pick them up. The orchestrator also uses it
//! to inject configuration into non-essential modules that declare a config
//! type through [`Module::accepts_config`](crate::Module::accepts_config).
//!
//! ## Rules
//! - One value per type; registering the same type again replaces the value in place.
//! - Lookup by predicate walks registrations in the order they were made.
//! - Cleared when the orchestrator stops.

use std::any::{Any, TypeId};
use std::sync::{Arc, PoisonError, RwLock};

use crate::modules::module::ModuleConfig;

struct Entry {
    ty: TypeId,
    value: ModuleConfig,
}

/// Shared, cloneable registry of exported objects.
#[derive(Clone, Default)]
pub struct Exports {
    entries: Arc<RwLock<Vec<Entry>>>,
}

impl Exports {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value` under its type, replacing any previous value of that type.
    pub fn register<T: Any + Send + Sync>(&self, value: T) {
        self.register_arc(Arc::new(value));
    }

    /// Registers an already shared value.
    pub fn register_arc<T: Any + Send + Sync>(&self, value: Arc<T>) {
        let ty = TypeId::of::<T>();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.iter_mut().find(|e| e.ty == ty) {
            Some(entry) => entry.value = value,
            None => entries.push(Entry { ty, value }),
        }
    }

    /// Returns the value registered for `T`.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let ty = TypeId::of::<T>();
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let value = entries.iter().find(|e| e.ty == ty)?.value.clone();
        value.downcast::<T>().ok()
    }

    /// Returns the first registered value whose type satisfies `accepts`.
    pub fn find(&self, mut accepts: impl FnMut(TypeId) -> bool) -> Option<ModuleConfig> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .find(|e| accepts(e.ty))
            .map(|e| e.value.clone())
    }

    /// Number of registered values.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
