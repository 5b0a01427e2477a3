//! # Event subscribers for the modvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and built-in implementations for handling events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ```text
//! Round pass / start job / shutdown ── publish(Event) ──► Bus ──► listener
//!                                                                    │
//!                                                       SubscriberSet::emit(Event)
//!                                                      ┌─────────┼─────────┐
//!                                                      ▼         ▼         ▼
//!                                                  LogWriter  Metrics   Custom
//! ```

mod embedded;
mod subscriber;
mod subscriber_set;

pub use embedded::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
