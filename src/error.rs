//! Error types used by the watchmen runtime.
//!
//! This module defines three enums:
//!
//! - [`WatchError`]: what a supervised call can fail with.
//! - [`ConfigError`]: rejected limits or sampling interval.
//! - [`SampleError`]: process inspection failures (handled inside watchdogs).
//!
//! [`WatchError`] and [`SampleError`] provide `as_label` for logging/metrics.

use std::time::Duration;
use thiserror::Error;

use crate::events::Violation;

/// # Errors produced by a supervised call.
///
/// Exactly one outcome is produced per call: the operation's value, its own error
/// ([`WatchError::Operation`]) or a limit violation ([`WatchError::LimitExceeded`]).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WatchError<E> {
    /// A watchdog tripped before the operation finished.
    ///
    /// The operation itself is **not** stopped; only the wait ends.
    #[error("{0}")]
    LimitExceeded(Violation),

    /// The operation returned an error; carried as-is.
    #[error(transparent)]
    Operation(E),

    /// The OS refused to start the operation's thread (or the runtime of a blocking call).
    #[error("failed to spawn operation thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// Every participant went away without reporting an outcome.
    #[error("operation ended without reporting an outcome")]
    Lost,
}

impl<E> WatchError<E> {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use watchmen::{Violation, WatchError};
    ///
    /// let err: WatchError<()> = WatchError::LimitExceeded(Violation::Time {
    ///     limit: Duration::from_secs(1),
    /// });
    /// assert_eq!(err.as_label(), "limit_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WatchError::LimitExceeded(_) => "limit_exceeded",
            WatchError::Operation(_) => "operation_failed",
            WatchError::Spawn(_) => "spawn_failed",
            WatchError::Lost => "outcome_lost",
        }
    }

    /// Returns `true` when a watchdog ended the call.
    pub fn is_limit(&self) -> bool {
        matches!(self, WatchError::LimitExceeded(_))
    }

    /// Returns the violation that ended the call, if any.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            WatchError::LimitExceeded(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the operation's own error, if that is what ended the call.
    pub fn into_operation(self) -> Option<E> {
        match self {
            WatchError::Operation(e) => Some(e),
            _ => None,
        }
    }
}

/// # Invalid watch configuration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `max_time` must be greater than zero.
    #[error("max_time must be > 0, got {0:?}")]
    MaxTime(Duration),

    /// `max_memory_mb` must be finite and greater than zero.
    #[error("max_memory_mb must be a finite value > 0, got {0}")]
    MaxMemory(f64),

    /// `sample_interval` must be greater than zero.
    #[error("sample_interval must be > 0, got {0:?}")]
    SampleInterval(Duration),
}

/// # Process inspection failures.
///
/// Watchdogs treat both variants as "the process is gone" and stop silently.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleError {
    /// The root process no longer exists.
    #[error("process {pid} no longer exists")]
    ProcessGone {
        /// Inspected process id.
        pid: u32,
    },

    /// The OS denied inspecting the process.
    #[error("access to process {pid} denied")]
    AccessDenied {
        /// Inspected process id.
        pid: u32,
    },
}

impl SampleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SampleError::ProcessGone { .. } => "process_gone",
            SampleError::AccessDenied { .. } => "access_denied",
        }
    }
}
