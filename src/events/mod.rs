//! Orchestration events and the bus they travel on.
//!
//! Every observable step of a run (a pass dispatching a batch, a module
//! starting or failing, the reverse sweep) is published as an [`Event`] on the
//! [`Bus`]. Publishers never wait for consumers.
//!
//! - Publishers: the orchestrator, round passes, start jobs, the shutdown
//!   sequencer and subscriber workers (overflow, panic).
//! - Consumers: the builder's listener feeding the
//!   [`SubscriberSet`](crate::SubscriberSet), and receivers from
//!   `Orchestrator::subscribe`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
