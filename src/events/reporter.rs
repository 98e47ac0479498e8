//! # Result channel shared by the participants of one supervised call.
//!
//! [`Reporter`] is a thin wrapper around [`tokio::sync::mpsc::UnboundedSender`] that
//! provides non-blocking event reporting from several producers (runner, watchdogs).
//!
//! ## Architecture
//! ```text
//! Producers (many):                   Consumer (one):
//!   OperationRunner ──┐
//!   TimeWatchdog    ──┼──► Reporter ──► Supervisor::execute (reads ONE event)
//!   MemoryWatchdog  ──┘  (unbounded)
//! ```
//!
//! ## Rules
//! - **Non-blocking report**: `report()` never waits, the channel is unbounded.
//! - **Fire-and-forget**: once the consumer is gone, events are dropped silently.
//! - **No ordering between producers**: arrival order decides the winner.

use tokio::sync::mpsc;

use super::event::Event;

/// Creates a result channel for one supervised call.
pub(crate) fn channel<T, E>() -> (Reporter<T, E>, mpsc::UnboundedReceiver<Event<T, E>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Reporter { tx }, rx)
}

/// Sender half of the result channel.
///
/// Cheap to clone; each participant owns one.
#[derive(Debug)]
pub(crate) struct Reporter<T, E> {
    tx: mpsc::UnboundedSender<Event<T, E>>,
}

impl<T, E> Clone for Reporter<T, E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T, E> Reporter<T, E> {
    /// Reports an event.
    ///
    /// Returns `false` if the supervisor stopped listening (the event was dropped).
    pub(crate) fn report(&self, ev: Event<T, E>) -> bool {
        self.tx.send(ev).is_ok()
    }

    /// Returns `true` once the supervisor stopped listening.
    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
