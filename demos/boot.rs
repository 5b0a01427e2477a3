//! # Example: boot
//!
//! Boots a small application the way a server host would: three essential
//! modules first, then a storage driver, a cache and a web front end that
//! depends on both. Runs until Ctrl-C (or three seconds), then shuts down in
//! reverse order.
//!
//! Demonstrates how to:
//! - Build a [`Catalog`] with an essential prefix.
//! - Inject essential config by name and publish objects through `Exports`.
//! - Observe the run with the built-in [`LogWriter`] and `tracing-subscriber`.
//! - Drive the whole lifecycle with [`Orchestrator::serve`].
//!
//! ## Flow
//! ```text
//! core → config → logging            (sequential)
//!            ├─► jdbc-postgres ─┐
//!            └─► cache ─────────┴─► web
//! Ctrl-C / 3s ─► stop: web, cache|jdbc-postgres, logging, config, core
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example boot
//! ```

use std::any::TypeId;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use modvisor::{
    Catalog, EssentialConfigs, LogWriter, Module, ModuleError, ModuleFn, ModuleRef, Orchestrator,
    OrchestratorConfig, StartContext, Subscribe,
};
use tokio_util::sync::CancellationToken;

/// Settings the config module publishes for everything after it.
#[derive(Debug)]
struct HttpSettings {
    port: u16,
}

/// Front end that discovers its settings from the exports registry.
struct Web {
    deps: Vec<String>,
}

#[async_trait]
impl Module for Web {
    fn name(&self) -> &str {
        "web"
    }

    fn dependencies(&self) -> &[String] {
        &self.deps
    }

    fn accepts_config(&self, ty: TypeId) -> bool {
        ty == TypeId::of::<HttpSettings>()
    }

    async fn start(&self, ctx: StartContext) -> Result<(), ModuleError> {
        let settings = ctx
            .config_as::<HttpSettings>()
            .ok_or_else(|| ModuleError::fail("missing http settings"))?;
        tracing::info!(port = settings.port, "[web] listening");
        Ok(())
    }

    async fn stop(&self) -> Result<(), ModuleError> {
        tracing::info!("[web] closed listener");
        Ok(())
    }
}

fn simple(name: &'static str, deps: &[&'static str], millis: u64) -> ModuleRef {
    ModuleFn::new(name, move |_ctx: StartContext| async move {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok(())
    })
    .depends_on(deps.iter().copied())
    .into_ref()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // 1. Essentials: core gets its data dir injected, config publishes settings.
    let core = ModuleFn::new("core", |ctx: StartContext| async move {
        let Some(dir) = ctx.config_as::<String>() else {
            return Err(ModuleError::fail("core needs a data directory"));
        };
        tracing::info!(dir = %dir, "[core] opened data directory");
        Ok(())
    })
    .into_ref();
    let config = ModuleFn::new("config", |ctx: StartContext| async move {
        ctx.exports().register(HttpSettings { port: 8080 });
        Ok(())
    })
    .depends_on(["core"])
    .into_ref();
    let logging = simple("logging", &["config"], 10);

    // 2. Regular modules; `web` depends on `jdbc`, satisfied by `jdbc-postgres`.
    let catalog = Catalog::builder()
        .essential(core)
        .essential(config)
        .essential(logging)
        .module(simple("jdbc-postgres", &["logging"], 200))
        .module(simple("cache", &["logging"], 100))
        .module(Arc::new(Web {
            deps: vec!["jdbc".into(), "cache".into()],
        }))
        .build()?;

    // 3. Orchestrator with the built-in log subscriber.
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let orch = Orchestrator::builder(catalog)
        .with_config(OrchestratorConfig {
            start_timeout: Duration::from_secs(5),
            ..OrchestratorConfig::default()
        })
        .with_subscribers(subs)
        .build();

    // 4. Stop by itself after a few seconds unless Ctrl-C comes first.
    let token = CancellationToken::new();
    let timer = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        timer.cancel();
    });

    let mut configs = EssentialConfigs::new();
    configs.insert("core".into(), Arc::new(String::from("/tmp/modvisor")));

    orch.serve(&["web", "cache", "jdbc-postgres"], configs, token)
        .await?;
    tracing::info!(failed = orch.has_failed(), "boot demo finished");
    Ok(())
}
