//! # Supervisor: races one operation against its watchdogs.
//!
//! The [`Supervisor`] owns the [`WatchConfig`] and the sampler factory. For every call it
//! builds a fresh set of participants around a single result channel, waits for the
//! **first** event and cancels the rest.
//!
//! ## High-level architecture
//! ```text
//! execute(launch):
//!   pid = std::process::id()                 (operation runs in-process)
//!   (reporter, rx) = events::channel()
//!   token = CancellationToken::new()         (DropGuard held for the whole call)
//!
//! Spawn participants (watchdogs first):
//!   MemoryWatchdog ─┐  if max_memory_mb
//!   TimeWatchdog   ─┤  if max_time
//!   runner         ─┘  always (launch(reporter))
//!        │
//!        └──► Reporter ──► rx.recv().await   (the only suspension point)
//!
//! Resolution:
//!   token.cancel()                           (advisory; nobody is joined)
//!   Success(v)        → Ok(v)
//!   Error(e)          → Err(WatchError::Operation(e))
//!   Panicked(payload) → resume_unwind(payload)
//!   LimitExceeded(v)  → Err(WatchError::LimitExceeded(v))
//! ```
//!
//! ## Rules
//! - No timeout on the wait itself; the time limit lives entirely in the time watchdog.
//! - Simultaneous trips are decided by channel arrival order; there is no priority.
//! - Dropping the `execute` future cancels the watchdogs (via the drop guard).
//! - The operation is never killed: after a limit fires it keeps running detached.

use std::fmt;
use std::io;
use std::panic;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::WatchConfig;
use crate::core::watchdog::{Limit, Watchdog};
use crate::error::WatchError;
use crate::events::{self, Event, Reporter};
use crate::sampler::{ProcessSampler, Sampler};

/// Creates one sampler per watchdog.
pub(crate) type SamplerFactory = Arc<dyn Fn() -> Box<dyn Sampler> + Send + Sync>;

pub(crate) fn default_sampler_factory() -> SamplerFactory {
    Arc::new(|| Box::new(ProcessSampler::new()) as Box<dyn Sampler>)
}

/// Arbitrates the race between the operation and its watchdogs.
#[derive(Clone)]
pub(crate) struct Supervisor {
    cfg: WatchConfig,
    sampler: SamplerFactory,
}

impl Supervisor {
    pub(crate) fn new(cfg: WatchConfig, sampler: SamplerFactory) -> Self {
        Self { cfg, sampler }
    }

    pub(crate) fn config(&self) -> &WatchConfig {
        &self.cfg
    }

    /// Runs one supervised call.
    ///
    /// `launch` must start the operation on its own schedule and hand it the reporter;
    /// it returns an error only if the operation could not be started at all.
    pub(crate) async fn execute<T, E, L>(&self, launch: L) -> Result<T, WatchError<E>>
    where
        T: Send + 'static,
        E: Send + 'static,
        L: FnOnce(Reporter<T, E>) -> io::Result<()>,
    {
        let pid = std::process::id();
        let (reporter, mut rx) = events::channel::<T, E>();
        let token = CancellationToken::new();
        let _guard = token.clone().drop_guard();

        self.spawn_watchdogs(pid, &token, &reporter);
        launch(reporter).map_err(WatchError::Spawn)?;

        let event = rx.recv().await;
        token.cancel();

        debug!(
            pid,
            outcome = event.as_ref().map_or("lost", Event::as_label),
            "supervised call resolved"
        );

        match event {
            Some(Event::Success(v)) => Ok(v),
            Some(Event::Error(e)) => Err(WatchError::Operation(e)),
            Some(Event::Panicked(payload)) => panic::resume_unwind(payload),
            Some(Event::LimitExceeded(v)) => Err(WatchError::LimitExceeded(v)),
            None => Err(WatchError::Lost),
        }
    }

    /// Spawns one watchdog per configured limit, all sharing `sample_interval`.
    fn spawn_watchdogs<T, E>(
        &self,
        pid: u32,
        token: &CancellationToken,
        reporter: &Reporter<T, E>,
    ) where
        T: Send + 'static,
        E: Send + 'static,
    {
        let limits = self
            .cfg
            .max_memory_mb
            .map(Limit::memory)
            .into_iter()
            .chain(self.cfg.max_time.map(Limit::time));

        for limit in limits {
            let wd = Watchdog::new(
                limit,
                (self.sampler)(),
                pid,
                self.cfg.sample_interval,
                token.child_token(),
                reporter.clone(),
            );
            tokio::spawn(wd.run());
        }
    }
}

impl fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}
