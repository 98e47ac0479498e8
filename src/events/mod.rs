//! Supervision events: the one-shot outcome and its delivery channel.
//!
//! ## Contents
//! - [`Event`], [`Violation`] outcome classification and limit details
//! - [`Reporter`] non-blocking sender half shared by all participants
//!
//! ## Quick reference
//! - **Producers**: the operation runner and every watchdog of one call.
//! - **Consumer**: `Supervisor::execute`, which reads exactly one event.

mod event;
mod reporter;

pub(crate) use event::Event;
pub use event::Violation;
pub(crate) use reporter::{channel, Reporter};
