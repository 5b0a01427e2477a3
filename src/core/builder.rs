//! # Orchestrator builder.
//!
//! Wires a [`Catalog`] with an [`OrchestratorConfig`] and optional subscribers.
//! With subscribers, `build()` spawns a listener that forwards bus events to
//! the [`SubscriberSet`] until the orchestrator is dropped.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{config::OrchestratorConfig, orchestrator::Orchestrator},
    events::Bus,
    modules::Catalog,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for an [`Orchestrator`] with config and event subscribers.
pub struct OrchestratorBuilder {
    catalog: Catalog,
    cfg: OrchestratorConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl OrchestratorBuilder {
    /// Starts from the default [`OrchestratorConfig`] and no subscribers.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            cfg: OrchestratorConfig::default(),
            subscribers: Vec::new(),
        }
    }

    /// Replaces the runtime configuration.
    pub fn with_config(mut self, cfg: OrchestratorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Each subscriber gets its own worker and bounded queue.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the orchestrator.
    ///
    /// With subscribers this spawns their workers and the bus listener, so it
    /// must be called from within a tokio runtime.
    pub fn build(self) -> Arc<Orchestrator> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let orch = Orchestrator::with_bus(self.catalog, self.cfg, bus.clone());
        if !self.subscribers.is_empty() {
            let subs = SubscriberSet::new(self.subscribers, bus.clone());
            subscriber_listener(&bus, subs, orch.runtime_token());
        }
        Arc::new(orch)
    }
}

/// Forwards bus events to the subscriber set until `token` is cancelled.
///
/// The subscriber workers hold bus clones, so the bus never closes on its own.
fn subscriber_listener(bus: &Bus, subs: SubscriberSet, token: CancellationToken) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(ev) => subs.emit(ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        subs.shutdown().await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EssentialConfigs;
    use crate::events::{Event, EventKind};
    use crate::modules::{ModuleFn, StartContext};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct Journal(Arc<Mutex<Vec<EventKind>>>);

    #[async_trait]
    impl Subscribe for Journal {
        async fn on_event(&self, ev: &Event) {
            self.0.lock().unwrap().push(ev.kind);
        }

        fn name(&self) -> &'static str {
            "journal"
        }
    }

    #[tokio::test]
    async fn subscribers_see_lifecycle_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let catalog = Catalog::builder()
            .module(ModuleFn::new("web", |_ctx: StartContext| async { Ok(()) }).into_ref())
            .build()
            .unwrap();
        let orch = OrchestratorBuilder::new(catalog)
            .with_subscribers(vec![Arc::new(Journal(seen.clone()))])
            .build();

        orch.start(&["web"], EssentialConfigs::new()).await.unwrap();
        orch.stop().await.unwrap();

        let mut tries = 0;
        while !seen.lock().unwrap().contains(&EventKind::ShutdownCompleted) && tries < 100 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            tries += 1;
        }
        let seen = seen.lock().unwrap();
        for kind in [
            EventKind::RunStarting,
            EventKind::ModuleStarted,
            EventKind::RunCompleted,
            EventKind::ModuleStopped,
            EventKind::ShutdownCompleted,
        ] {
            assert!(seen.contains(&kind), "missing {kind:?}");
        }
    }

    #[tokio::test]
    async fn dropping_the_orchestrator_releases_subscribers() {
        let journal = Arc::new(Journal(Arc::new(Mutex::new(Vec::new()))));
        let catalog = Catalog::builder()
            .module(ModuleFn::new("web", |_ctx: StartContext| async { Ok(()) }).into_ref())
            .build()
            .unwrap();
        let sub: Arc<dyn Subscribe> = journal.clone();
        let orch = OrchestratorBuilder::new(catalog)
            .with_subscribers(vec![sub])
            .build();
        assert!(Arc::strong_count(&journal) > 1);

        drop(orch);

        let mut tries = 0;
        while Arc::strong_count(&journal) > 1 && tries < 100 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            tries += 1;
        }
        assert_eq!(Arc::strong_count(&journal), 1);
    }
}
