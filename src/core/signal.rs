//! # Completion signal.
//!
//! One-shot gate the run-initiating task waits on. It is released exactly once,
//! by whichever scheduling pass observes the end of the run, with the run's
//! outcome. Later releases are ignored; waiting after release returns the stored
//! outcome immediately. A fresh signal is built for every run.
//!
//! ```text
//! pending ──release(outcome)──► released(outcome)
//!    ▲                              │
//!    └──── (never goes back) ◄──────┘   release(..) again → false
//! ```

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::ActivationError;

type Outcome = Option<Result<(), ActivationError>>;

#[derive(Clone)]
pub(crate) struct CompletionSignal {
    tx: Arc<watch::Sender<Outcome>>,
}

impl CompletionSignal {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Stores `outcome` if nothing was stored yet. Returns whether this call released the gate.
    pub(crate) fn release(&self, outcome: Result<(), ActivationError>) -> bool {
        self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(outcome);
            true
        })
    }

    pub(crate) fn is_released(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Waits for the outcome.
    pub(crate) async fn wait(&self) -> Result<(), ActivationError> {
        let mut rx = self.tx.subscribe();
        match rx.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone().unwrap_or(Ok(())),
            // `self` keeps the sender alive, so the channel cannot close under us.
            Err(_closed) => Err(ActivationError::RunFailed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn releases_exactly_once() {
        let signal = CompletionSignal::new();
        assert!(!signal.is_released());

        assert!(signal.release(Ok(())));
        assert!(!signal.release(Err(ActivationError::RunFailed)));
        assert!(signal.is_released());

        assert_eq!(signal.wait().await, Ok(()));
        assert_eq!(signal.wait().await, Ok(()), "idempotent wait");
    }

    #[tokio::test]
    async fn waiter_wakes_on_release() {
        let signal = CompletionSignal::new();
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.wait().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        signal.release(Err(ActivationError::DeadlockStall {
            pending: vec!["c".into()],
        }));

        let outcome = waiter.await.unwrap();
        assert_eq!(
            outcome,
            Err(ActivationError::DeadlockStall {
                pending: vec!["c".into()]
            })
        );
    }
}
