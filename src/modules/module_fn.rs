//! # Function-backed module (`ModuleFn`)
//!
//! [`ModuleFn`] wraps a closure `F: Fn(StartContext) -> Fut`, producing a fresh
//! future per start. An optional stop closure can be attached with
//! [`ModuleFn::with_stop`]; without one, `stop()` is a no-op.
//!
//! ## Example
//! ```rust
//! use modvisor::{ModuleFn, ModuleRef, ModuleError, StartContext};
//!
//! let web: ModuleRef = ModuleFn::new("web", |_ctx: StartContext| async move {
//!     Ok::<_, ModuleError>(())
//! })
//! .depends_on(["logging", "jdbc"])
//! .with_stop(|| async { Ok(()) })
//! .into_ref();
//!
//! assert_eq!(web.name(), "web");
//! assert_eq!(web.dependencies(), ["logging", "jdbc"]);
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::ModuleError;
use crate::modules::module::{Module, ModuleRef, StartContext};

type StopFn = Box<dyn Fn() -> BoxFuture<'static, Result<(), ModuleError>> + Send + Sync>;

/// Function-backed module implementation.
pub struct ModuleFn<F> {
    name: Cow<'static, str>,
    dependencies: Vec<String>,
    start: F,
    stop: Option<StopFn>,
}

impl<F, Fut> ModuleFn<F>
where
    F: Fn(StartContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ModuleError>> + Send + 'static,
{
    /// Creates a module with no dependencies and a no-op stop.
    pub fn new(name: impl Into<Cow<'static, str>>, start: F) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            start,
            stop: None,
        }
    }

    /// Appends declared dependency names.
    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(deps.into_iter().map(Into::into));
        self
    }

    /// Attaches a stop closure.
    pub fn with_stop<S, SFut>(mut self, stop: S) -> Self
    where
        S: Fn() -> SFut + Send + Sync + 'static,
        SFut: Future<Output = Result<(), ModuleError>> + Send + 'static,
    {
        self.stop = Some(Box::new(move || Box::pin(stop())));
        self
    }

    /// Returns the module as a shared handle (`Arc<dyn Module>`).
    pub fn into_ref(self) -> ModuleRef {
        Arc::new(self)
    }
}

#[async_trait]
impl<F, Fut> Module for ModuleFn<F>
where
    F: Fn(StartContext) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), ModuleError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    async fn start(&self, ctx: StartContext) -> Result<(), ModuleError> {
        (self.start)(ctx).await
    }

    async fn stop(&self) -> Result<(), ModuleError> {
        match &self.stop {
            Some(stop) => stop().await,
            None => Ok(()),
        }
    }
}
