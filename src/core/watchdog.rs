//! # Watchdog: periodic limit check against one process.
//!
//! A [`Watchdog`] ticks every `sample_interval` and evaluates a single [`Limit`]
//! against the supervised process. It reports **at most one** violation.
//!
//! ## State machine
//! ```text
//! Running ──tick──► Running            (limit holds)
//!    │
//!    ├──► Tripped       report LimitExceeded, stop ticking
//!    ├──► Cancelled     token cancelled (supervisor resolved or caller gone)
//!    └──► ProcessEnded  process gone / not inspectable (silent, no event)
//! ```
//!
//! ## Rules
//! - The time budget starts on the **first tick**, not at construction.
//! - Sampler failures never escape: they end the watchdog silently.
//! - Sampler calls run on tokio's blocking pool; the limit is evaluated on the task.
//! - Cancellation is observed at the next tick boundary at the latest.

use std::time::Duration;

use tokio::task;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::events::{Event, Reporter, Violation};
use crate::sampler::{bytes_to_mb, Sampler};

/// The predicate a watchdog evaluates on each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Limit {
    /// Elapsed wall-clock time since the first tick must stay within `max`.
    Time {
        max: Duration,
        started: Option<Instant>,
    },
    /// RSS of the process tree must stay within `max_mb`.
    Memory { max_mb: f64 },
}

impl Limit {
    pub(crate) fn time(max: Duration) -> Self {
        Limit::Time { max, started: None }
    }

    pub(crate) fn memory(max_mb: f64) -> Self {
        Limit::Memory { max_mb }
    }

    fn as_label(&self) -> &'static str {
        match self {
            Limit::Time { .. } => "time",
            Limit::Memory { .. } => "memory",
        }
    }

    fn needs_rss(&self) -> bool {
        matches!(self, Limit::Memory { .. })
    }

    /// Evaluates the predicate once. `Some(_)` means the limit is breached.
    ///
    /// `rss_bytes` is only read by the memory limit.
    fn evaluate(&mut self, rss_bytes: Option<u64>) -> Option<Violation> {
        match self {
            Limit::Time { max, started } => {
                let started = *started.get_or_insert_with(Instant::now);
                (started.elapsed() > *max).then_some(Violation::Time { limit: *max })
            }
            Limit::Memory { max_mb } => {
                let rss_mb = bytes_to_mb(rss_bytes?);
                (rss_mb > *max_mb).then_some(Violation::Memory {
                    rss_mb,
                    limit_mb: *max_mb,
                })
            }
        }
    }
}

/// What the sampler saw on one tick.
enum Probe {
    /// Process alive; RSS in bytes when the limit needs it.
    Alive(Option<u64>),
    /// Process gone or not inspectable; carries the reason label.
    Ended(&'static str),
}

/// Terminal state of a watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WatchdogExit {
    /// Reported a violation.
    Tripped,
    /// Stopped because the token was cancelled.
    Cancelled,
    /// Stopped because the process is gone or could not be inspected.
    ProcessEnded,
}

/// Independently scheduled monitor of one limit.
pub(crate) struct Watchdog<T, E> {
    limit: Limit,
    // Lent to the blocking pool for the duration of each probe.
    sampler: Option<Box<dyn Sampler>>,
    pid: u32,
    interval: Duration,
    token: CancellationToken,
    reporter: Reporter<T, E>,
}

impl<T, E> Watchdog<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub(crate) fn new(
        limit: Limit,
        sampler: Box<dyn Sampler>,
        pid: u32,
        interval: Duration,
        token: CancellationToken,
        reporter: Reporter<T, E>,
    ) -> Self {
        Self {
            limit,
            sampler: Some(sampler),
            pid,
            interval,
            token,
            reporter,
        }
    }

    /// Ticks until the limit trips, the token is cancelled, or the process ends.
    pub(crate) async fn run(mut self) -> WatchdogExit {
        let kind = self.limit.as_label();
        debug!(pid = self.pid, limit = kind, interval = ?self.interval, "watchdog started");

        let exit = loop {
            if self.token.is_cancelled() {
                break WatchdogExit::Cancelled;
            }

            let rss = match self.probe().await {
                Probe::Alive(rss) => rss,
                Probe::Ended(reason) => {
                    debug!(pid = self.pid, limit = kind, reason, "sampling stopped");
                    break WatchdogExit::ProcessEnded;
                }
            };
            if self.token.is_cancelled() {
                break WatchdogExit::Cancelled;
            }

            if let Some(violation) = self.limit.evaluate(rss) {
                warn!(pid = self.pid, limit = kind, %violation, "limit exceeded");
                self.reporter.report(Event::LimitExceeded(violation));
                break WatchdogExit::Tripped;
            }

            tokio::select! {
                _ = self.token.cancelled() => break WatchdogExit::Cancelled,
                _ = time::sleep(self.interval) => {}
            }
        };

        debug!(pid = self.pid, limit = kind, exit = ?exit, "watchdog stopped");
        exit
    }

    /// Checks liveness (and RSS for the memory limit) off the async workers.
    async fn probe(&mut self) -> Probe {
        let Some(mut sampler) = self.sampler.take() else {
            return Probe::Ended("sampler_lost");
        };
        let pid = self.pid;
        let needs_rss = self.limit.needs_rss();

        let joined = task::spawn_blocking(move || {
            let probe = if !sampler.is_running(pid) {
                Probe::Ended("process_ended")
            } else if needs_rss {
                match sampler.sample(pid) {
                    Ok(bytes) => Probe::Alive(Some(bytes)),
                    Err(err) => Probe::Ended(err.as_label()),
                }
            } else {
                Probe::Alive(None)
            };
            (sampler, probe)
        })
        .await;

        match joined {
            Ok((sampler, probe)) => {
                self.sampler = Some(sampler);
                probe
            }
            Err(_) => Probe::Ended("sampler_panicked"),
        }
    }
}
