//! # Outcome events raced against each other by one supervised call.
//!
//! The [`Event`] enum classifies what a participant reports:
//! - **Operation outcomes**: `Success`, `Error`, `Panicked` (from the runner)
//! - **Watchdog outcome**: `LimitExceeded` (from a time or memory watchdog)
//!
//! The first event to reach the channel resolves the call; any later ones are never read.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use watchmen::Violation;
//!
//! let v = Violation::Time { limit: Duration::from_secs(1) };
//! assert_eq!(v.to_string(), "Time limit exceeded");
//! assert_eq!(v.as_label(), "time");
//! ```

use std::any::Any;
use std::fmt;
use std::time::Duration;

/// Which limit fired, with the values observed at the time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Violation {
    /// Wall-clock budget exhausted.
    Time {
        /// The configured budget.
        limit: Duration,
    },
    /// Resident memory of the process tree went over the ceiling.
    Memory {
        /// Measured RSS in MB (bytes / 1024²).
        rss_mb: f64,
        /// The configured ceiling in MB.
        limit_mb: f64,
    },
}

impl Violation {
    /// Returns a short stable label for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Violation::Time { .. } => "time",
            Violation::Memory { .. } => "memory",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Time { .. } => f.write_str("Time limit exceeded"),
            Violation::Memory { rss_mb, .. } => {
                write!(f, "Memory limit exceeded. RSS: {rss_mb:.2} MB")
            }
        }
    }
}

/// One-shot result reported by a participant.
pub(crate) enum Event<T, E> {
    /// The operation returned a value.
    Success(T),
    /// The operation returned an error.
    Error(E),
    /// The operation panicked; carries the original payload.
    Panicked(Box<dyn Any + Send + 'static>),
    /// A watchdog tripped.
    LimitExceeded(Violation),
}

impl<T, E> Event<T, E> {
    /// Returns a short stable label for use in logs/metrics.
    pub(crate) fn as_label(&self) -> &'static str {
        match self {
            Event::Success(_) => "success",
            Event::Error(_) => "error",
            Event::Panicked(_) => "panicked",
            Event::LimitExceeded(_) => "limit_exceeded",
        }
    }
}

impl<T, E> fmt::Debug for Event<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::LimitExceeded(v) => f.debug_tuple("LimitExceeded").field(v).finish(),
            other => f.write_str(other.as_label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_message_carries_measured_rss() {
        let v = Violation::Memory {
            rss_mb: 812.25,
            limit_mb: 100.0,
        };
        assert_eq!(v.to_string(), "Memory limit exceeded. RSS: 812.25 MB");
        assert_eq!(v.as_label(), "memory");
    }

    #[test]
    fn event_labels() {
        let ok: Event<u8, ()> = Event::Success(1);
        let limit: Event<u8, ()> = Event::LimitExceeded(Violation::Time {
            limit: Duration::from_secs(2),
        });
        assert_eq!(ok.as_label(), "success");
        assert_eq!(format!("{ok:?}"), "success");
        assert_eq!(limit.as_label(), "limit_exceeded");
        assert!(format!("{limit:?}").starts_with("LimitExceeded(Time"));
    }
}
