//! # Module abstraction.
//!
//! A [`Module`] is an independently activatable unit with a stable name, a list of
//! declared dependency names, and async [`start`](Module::start) / [`stop`](Module::stop)
//! operations. The common handle type is [`ModuleRef`], an `Arc<dyn Module>` shared
//! between the catalog and the orchestrator.
//!
//! ## Dependency names are prefixes
//! A declared dependency `d` is satisfied by **any** started module whose name
//! starts with `d`: a module named `jdbc-postgres` satisfies a dependency on `jdbc`.

use std::any::{Any, TypeId};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ModuleError;
use crate::modules::exports::Exports;

/// Opaque configuration value handed to [`Module::start`].
pub type ModuleConfig = Arc<dyn Any + Send + Sync>;

/// Shared handle to a module.
pub type ModuleRef = Arc<dyn Module>;

/// What a module receives when it is started.
#[derive(Clone)]
pub struct StartContext {
    config: Option<ModuleConfig>,
    exports: Exports,
}

impl StartContext {
    pub(crate) fn new(config: Option<ModuleConfig>, exports: Exports) -> Self {
        Self { config, exports }
    }

    /// Injected configuration, if any.
    ///
    /// Essential modules get the value the caller supplied under their name;
    /// other modules get the first registered export whose type they accept.
    pub fn config(&self) -> Option<&ModuleConfig> {
        self.config.as_ref()
    }

    /// Injected configuration downcast to `T`.
    pub fn config_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.config.clone()?.downcast::<T>().ok()
    }

    /// Registry where started modules publish objects for later modules.
    pub fn exports(&self) -> &Exports {
        &self.exports
    }
}

/// # Activatable runtime module.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use modvisor::{Module, ModuleError, StartContext};
///
/// struct Web { deps: Vec<String> }
///
/// #[async_trait]
/// impl Module for Web {
///     fn name(&self) -> &str { "web" }
///     fn dependencies(&self) -> &[String] { &self.deps }
///
///     async fn start(&self, _ctx: StartContext) -> Result<(), ModuleError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Module: Send + Sync + 'static {
    /// Returns a stable name, unique within a catalog.
    fn name(&self) -> &str;

    /// Declared dependency names (matched by prefix).
    fn dependencies(&self) -> &[String] {
        &[]
    }

    /// Whether this module wants an export of type `ty` injected as its config.
    ///
    /// Only consulted for non-essential modules.
    fn accepts_config(&self, _ty: TypeId) -> bool {
        false
    }

    /// Activates the module. Called at most once per run.
    async fn start(&self, ctx: StartContext) -> Result<(), ModuleError>;

    /// Deactivates the module. Failures are reported, never fatal.
    async fn stop(&self) -> Result<(), ModuleError> {
        Ok(())
    }
}
