//! # Supervised operations.
//!
//! [`Watch`] is a configured supervisor. It can run a one-shot closure/future
//! ([`Watch::run`], [`Watch::run_async`]) or bind a reusable operation into a
//! [`Watched`] wrapper ([`Watch::wrap`]).
//!
//! Async callers use [`Watched::call`]; synchronous code uses [`Watched::call_blocking`],
//! which needs no surrounding runtime.
//!
//! ## Arguments
//! A wrapped operation takes **one** argument value. Several positional arguments
//! become a tuple, named ones a struct; the value is moved unchanged into the call.
//!
//! ## Concurrency semantics
//! - Every call builds a fresh set of participants; nothing is shared between calls.
//! - Two wrappers built from the same [`Watch`] share configuration only.
//! - A limit violation ends the *wait*, not the operation: a blocking operation keeps
//!   running on its detached thread until it returns on its own.
//!
//! ## Example
//! ```rust
//! use std::convert::Infallible;
//! use std::time::Duration;
//! use watchmen::{watch, Watch, WatchError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let add = watch(|(a, b): (i32, i32)| Ok::<_, Infallible>(a + b));
//!     assert_eq!(add.call((2, 3)).await.unwrap(), 5);
//!
//!     let strict = Watch::builder()
//!         .max_time(Duration::from_millis(200))
//!         .sample_rate(Duration::from_millis(20))
//!         .build()
//!         .unwrap();
//!     let slow = strict.wrap(|ms: u64| {
//!         std::thread::sleep(Duration::from_millis(ms));
//!         Ok::<_, Infallible>(())
//!     });
//!     let err = slow.call(2_000).await.unwrap_err();
//!     assert!(matches!(err, WatchError::LimitExceeded(_)));
//!     assert_eq!(err.to_string(), "Time limit exceeded");
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::runtime;

use crate::config::WatchConfig;
use crate::core::{default_sampler_factory, runner, Supervisor};
use crate::error::WatchError;

use super::builder::WatchBuilder;

/// Configured supervisor: limits and sampling rate applied to every call.
///
/// `Watch::default()` has no limits: calls behave like unsupervised ones,
/// except that the operation runs on its own thread.
#[derive(Clone, Debug)]
pub struct Watch {
    supervisor: Supervisor,
}

impl Watch {
    /// Returns a builder for a configured [`Watch`].
    pub fn builder() -> WatchBuilder {
        WatchBuilder::new()
    }

    pub(crate) fn from_supervisor(supervisor: Supervisor) -> Self {
        Self { supervisor }
    }

    /// Returns the configuration applied to every call.
    pub fn config(&self) -> &WatchConfig {
        self.supervisor.config()
    }

    /// Binds an operation to this configuration.
    pub fn wrap<F>(&self, f: F) -> Watched<F> {
        Watched {
            f: Arc::new(f),
            watch: self.clone(),
        }
    }

    /// Runs a blocking operation once under supervision.
    ///
    /// The closure runs on a dedicated OS thread. A panic inside it is re-raised here.
    pub async fn run<T, E, F>(&self, op: F) -> Result<T, WatchError<E>>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.supervisor
            .execute(move |reporter| runner::spawn_blocking(op, reporter))
            .await
    }

    /// Runs an async operation once under supervision.
    ///
    /// The future is spawned on the current tokio runtime; after a limit fires it
    /// keeps running until it completes or the runtime shuts down.
    pub async fn run_async<T, E, Fut>(&self, fut: Fut) -> Result<T, WatchError<E>>
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.supervisor
            .execute(move |reporter| {
                runner::spawn_async(fut, reporter);
                Ok(())
            })
            .await
    }
}

impl Watch {
    /// Synchronous flavour of [`run`](Self::run) for callers without a runtime.
    ///
    /// Drives the call on a private current-thread runtime that lives for this call only.
    ///
    /// # Panics
    /// Panics if called from within a tokio runtime, like any nested `block_on`.
    pub fn run_blocking<T, E, F>(&self, op: F) -> Result<T, WatchError<E>>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let rt = runtime::Builder::new_current_thread()
            .enable_time()
            .thread_name("watchmen-rt")
            .build()
            .map_err(WatchError::Spawn)?;
        rt.block_on(self.run(op))
    }
}

impl Default for Watch {
    fn default() -> Self {
        Self::from_supervisor(Supervisor::new(
            WatchConfig::default(),
            default_sampler_factory(),
        ))
    }
}

/// Wraps `f` without limits; shorthand for `Watch::default().wrap(f)`.
pub fn watch<F>(f: F) -> Watched<F> {
    Watch::default().wrap(f)
}

/// An operation bound to a [`Watch`].
///
/// Cheap to clone; clones share the operation and the configuration.
pub struct Watched<F> {
    f: Arc<F>,
    watch: Watch,
}

impl<F> Watched<F> {
    /// Calls the operation with `args` under supervision.
    ///
    /// Returns the operation's value, its own error as [`WatchError::Operation`], or
    /// [`WatchError::LimitExceeded`] if a watchdog tripped first.
    pub async fn call<A, T, E>(&self, args: A) -> Result<T, WatchError<E>>
    where
        F: Fn(A) -> Result<T, E> + Send + Sync + 'static,
        A: Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let f = Arc::clone(&self.f);
        self.watch.run(move || f(args)).await
    }

    /// Calls the operation from synchronous code, with the same outcomes as [`call`](Self::call).
    ///
    /// This makes a [`Watched`] a drop-in replacement for the plain function. See
    /// [`Watch::run_blocking`] for the runtime it uses.
    pub fn call_blocking<A, T, E>(&self, args: A) -> Result<T, WatchError<E>>
    where
        F: Fn(A) -> Result<T, E> + Send + Sync + 'static,
        A: Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let f = Arc::clone(&self.f);
        self.watch.run_blocking(move || f(args))
    }

    /// Returns the configuration applied to every call.
    pub fn config(&self) -> &WatchConfig {
        self.watch.config()
    }
}

impl<F> Clone for Watched<F> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
            watch: self.watch.clone(),
        }
    }
}

impl<F> fmt::Debug for Watched<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watched")
            .field("config", self.watch.config())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::time::Duration;

    #[tokio::test]
    async fn wrapper_is_reusable() {
        let double = watch(|x: u64| Ok::<_, Infallible>(x * 2));
        assert_eq!(double.call(2).await.ok(), Some(4));
        assert_eq!(double.call(21).await.ok(), Some(42));
        assert_eq!(double.clone().call(5).await.ok(), Some(10));
    }

    #[tokio::test]
    async fn run_async_returns_value() {
        let w = Watch::builder()
            .max_time(Duration::from_secs(5))
            .build()
            .expect("valid config");
        let out = w
            .run_async(async { Ok::<_, Infallible>("done") })
            .await;
        assert_eq!(out.ok(), Some("done"));
    }

    #[tokio::test]
    async fn run_async_hits_time_limit() {
        let w = Watch::builder()
            .max_time(Duration::from_millis(100))
            .sample_rate(Duration::from_millis(10))
            .build()
            .expect("valid config");
        let out = w
            .run_async(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, Infallible>(())
            })
            .await;
        assert!(out.is_err_and(|e| e.is_limit()));
    }

    #[test]
    fn blocking_call_without_runtime() {
        let w = Watch::builder()
            .max_time(Duration::from_millis(200))
            .sample_rate(Duration::from_millis(20))
            .build()
            .expect("valid config");
        let nap = w.wrap(|ms: u64| {
            std::thread::sleep(Duration::from_millis(ms));
            Ok::<_, Infallible>(ms)
        });

        assert_eq!(nap.call_blocking(10).ok(), Some(10));
        let err = nap.call_blocking(3_000).expect_err("must time out");
        assert_eq!(err.to_string(), "Time limit exceeded");
    }

    #[test]
    fn debug_shows_config() {
        let w = watch(|_: ()| Ok::<_, Infallible>(()));
        let s = format!("{w:?}");
        assert!(s.starts_with("Watched"), "{s}");
        assert!(s.contains("sample_interval"), "{s}");
    }
}
