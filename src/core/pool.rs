//! # Bounded worker pool.
//!
//! A fixed number of execution slots (a [`Semaphore`]) shared by module starts
//! and scheduling passes. Every unit of work is spawned on the tokio runtime
//! through a [`TaskTracker`] and holds one permit while it runs, so no more
//! than `size` units ever execute at once.
//!
//! ```text
//! submit(fut) ──► tracker.spawn ──► acquire permit ──► fut.await ──► release
//! drain()     ──► tracker.close ──► wait for every spawned unit
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tokio_util::task::TaskTracker;

/// Semaphore-bounded spawner; cheap to clone.
#[derive(Clone)]
pub(crate) struct WorkerPool {
    slots: Arc<Semaphore>,
    tracker: TaskTracker,
}

impl WorkerPool {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(size.max(1))),
            tracker: TaskTracker::new(),
        }
    }

    /// Submits fire-and-forget work.
    pub(crate) fn submit<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let slots = Arc::clone(&self.slots);
        self.tracker.spawn(async move {
            // The pool never closes its semaphore.
            let _permit = slots.acquire_owned().await.ok();
            fut.await;
        });
    }

    /// Runs `fut` on a slot and awaits its output.
    pub(crate) async fn run<F, T>(&self, fut: F) -> Result<T, JoinError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let slots = Arc::clone(&self.slots);
        self.tracker
            .spawn(async move {
                let _permit = slots.acquire_owned().await.ok();
                fut.await
            })
            .await
    }

    /// Waits until every unit submitted so far (and any they submit) has finished.
    pub(crate) async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn never_exceeds_pool_size() {
        let pool = WorkerPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let running = running.clone();
            let peak = peak.clone();
            pool.submit(async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            });
        }
        pool.drain().await;

        assert_eq!(running.load(Ordering::SeqCst), 0);
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn run_returns_output() {
        let pool = WorkerPool::new(1);
        assert_eq!(pool.run(async { 7 }).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn drain_waits_for_nested_submissions() {
        let pool = WorkerPool::new(1);
        let done = Arc::new(AtomicUsize::new(0));

        let inner_pool = pool.clone();
        let counter = done.clone();
        pool.submit(async move {
            let counter2 = counter.clone();
            inner_pool.submit(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                counter2.fetch_add(1, Ordering::SeqCst);
            });
            counter.fetch_add(1, Ordering::SeqCst);
        });
        pool.drain().await;

        assert_eq!(done.load(Ordering::SeqCst), 2);
    }
}
