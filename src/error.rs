//! Error types used by the modvisor runtime and by modules.
//!
//! This module defines the error enums surfaced by the orchestrator:
//!
//! - [`ActivationError`]: fatal errors of an activation run (the caller sees exactly one).
//! - [`ModuleError`]: errors raised by an individual module's `start()`/`stop()`.
//! - [`StopFailure`] / [`ShutdownError`]: stop failures accumulated during the reverse sweep.
//! - [`RuntimeError`]: everything [`serve`](crate::Orchestrator::serve) can return.
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Fatal errors of an activation run.
///
/// Every variant aborts the run; nothing is retried automatically.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActivationError {
    /// One or more requested names are absent from the catalog; no module was touched.
    #[error("unknown module(s) requested: {names:?}")]
    UnknownModuleRequested {
        /// Requested names that the catalog does not know.
        names: Vec<String>,
    },

    /// The catalog contains the same module name twice.
    #[error("duplicate module in catalog: {name}")]
    DuplicateModule {
        /// The duplicated name.
        name: String,
    },

    /// One of the essential bootstrap modules failed to start.
    #[error("essential module {module} failed to start: {error}")]
    EssentialStartFailure {
        /// Failed module name.
        module: String,
        /// Failure reported by the module.
        error: ModuleError,
    },

    /// A non-essential module failed to start; the run is permanently failed.
    #[error("module {module} failed to start: {error}")]
    ModuleStartFailure {
        /// Failed module name.
        module: String,
        /// Failure reported by the module.
        error: ModuleError,
    },

    /// Nothing is eligible, nothing is in flight, yet some requested modules never started.
    #[error("activation stalled; unsatisfiable or cyclic dependencies for: {pending:?}")]
    DeadlockStall {
        /// Requested modules that can never become eligible.
        pending: Vec<String>,
    },

    /// A previous run of this orchestrator failed; it refuses to start again.
    #[error("orchestrator is in failed state after a previous run")]
    RunFailed,

    /// `start` was called while modules from a previous run are still started.
    #[error("orchestrator is already running")]
    AlreadyRunning,
}

impl ActivationError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use modvisor::ActivationError;
    ///
    /// let err = ActivationError::DeadlockStall { pending: vec!["web".into()] };
    /// assert_eq!(err.as_label(), "activation_deadlock_stall");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ActivationError::UnknownModuleRequested { .. } => "activation_unknown_module",
            ActivationError::DuplicateModule { .. } => "activation_duplicate_module",
            ActivationError::EssentialStartFailure { .. } => "activation_essential_failed",
            ActivationError::ModuleStartFailure { .. } => "activation_module_failed",
            ActivationError::DeadlockStall { .. } => "activation_deadlock_stall",
            ActivationError::RunFailed => "activation_run_failed",
            ActivationError::AlreadyRunning => "activation_already_running",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ActivationError::UnknownModuleRequested { names } => {
                format!("unknown modules requested: {}", names.join(", "))
            }
            ActivationError::DuplicateModule { name } => format!("duplicate module: {name}"),
            ActivationError::EssentialStartFailure { module, error } => {
                format!("essential module={module} {}", error.as_message())
            }
            ActivationError::ModuleStartFailure { module, error } => {
                format!("module={module} {}", error.as_message())
            }
            ActivationError::DeadlockStall { pending } => {
                format!("stalled with pending modules={pending:?}")
            }
            ActivationError::RunFailed => "previous run failed".to_string(),
            ActivationError::AlreadyRunning => "already running".to_string(),
        }
    }

    /// Returns `true` if this error marks the orchestrator as permanently failed.
    ///
    /// Validation errors (`UnknownModuleRequested`, `DuplicateModule`, `AlreadyRunning`)
    /// reject the call before anything is touched and leave the orchestrator usable.
    pub fn is_sticky(&self) -> bool {
        matches!(
            self,
            ActivationError::EssentialStartFailure { .. }
                | ActivationError::ModuleStartFailure { .. }
                | ActivationError::DeadlockStall { .. }
                | ActivationError::RunFailed
        )
    }
}

/// # Errors produced by a module's `start()` or `stop()`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// The module reported a failure.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The call exceeded the configured timeout.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// The call panicked.
    #[error("panicked: {info}")]
    Panicked {
        /// Panic payload, if it was a string.
        info: String,
    },
}

impl ModuleError {
    /// Shorthand for [`ModuleError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        ModuleError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use modvisor::ModuleError;
    /// use std::time::Duration;
    ///
    /// let err = ModuleError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "module_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ModuleError::Fail { .. } => "module_failed",
            ModuleError::Timeout { .. } => "module_timeout",
            ModuleError::Panicked { .. } => "module_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ModuleError::Fail { error } => format!("error: {error}"),
            ModuleError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            ModuleError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

/// A single module that failed to stop during shutdown.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("module {module} failed to stop: {error}")]
pub struct StopFailure {
    /// Module name.
    pub module: String,
    /// Failure reported by the module.
    pub error: ModuleError,
}

/// Stop failures accumulated over one full reverse sweep.
///
/// Returned only after every started module had its `stop()` invoked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} module(s) failed to stop: {failures:?}", .failures.len())]
pub struct ShutdownError {
    /// Failures in the order they were observed (reverse start order).
    pub failures: Vec<StopFailure>,
}

impl ShutdownError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        "shutdown_stop_failed"
    }

    /// Names of the modules that failed to stop.
    pub fn modules(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.module.as_str()).collect()
    }
}

/// # Errors returned by [`Orchestrator::serve`](crate::Orchestrator::serve).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Activation failed; nothing is left started.
    #[error(transparent)]
    Activation(#[from] ActivationError),

    /// Every module was asked to stop, but some failed.
    #[error(transparent)]
    Shutdown(#[from] ShutdownError),

    /// OS signal listeners could not be registered.
    #[error("failed to install signal handlers: {0}")]
    Signal(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Activation(e) => e.as_label(),
            RuntimeError::Shutdown(e) => e.as_label(),
            RuntimeError::Signal(_) => "runtime_signal_failed",
        }
    }
}

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_info(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
