//! # watchmen
//!
//! **watchmen** runs an operation under resource supervision: a wall-clock budget
//! and/or a resident-memory ceiling (summed over the process and its children).
//! The caller's wait ends with [`WatchError::LimitExceeded`] the moment a limit is
//! breached, or with the operation's own value or error if it finishes first.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!        Watched::call(args) / Watch::run(op) / Watch::run_async(fut)
//!              (call_blocking / run_blocking: same, on a private runtime)
//!                                   │
//!                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor::execute                                              │
//! │  - fresh result channel + CancellationToken per call              │
//! │  - starts watchdogs first, then the operation                     │
//! │  - waits for the FIRST event, cancels the rest                    │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐
//! │MemoryWatchdog│   │ TimeWatchdog │   │ OperationRunner  │
//! │ (tokio task) │   │ (tokio task) │   │ (thread / task)  │
//! └──────┬───────┘   └──────┬───────┘   └────────┬─────────┘
//!        │ LimitExceeded    │ LimitExceeded      │ Success / Error / Panicked
//!        ▼                  ▼                    ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │           Reporter (unbounded mpsc, never blocks producers)       │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                  Ok(value) / Err(WatchError::Operation(e))
//!                  Err(WatchError::LimitExceeded(v)) / resume_unwind
//! ```
//!
//! ### Cancellation is cooperative
//! When a limit fires, only the **wait** stops and the watchdogs are released.
//! The operation itself is never killed: a blocking closure keeps running on its
//! detached thread, an async one on its tokio task. Do not assume its side effects
//! stopped.
//!
//! ## Features
//! | Area              | Description                                           | Key types                          |
//! |-------------------|-------------------------------------------------------|------------------------------------|
//! | **Supervision**   | Run closures/futures under time and memory limits.    | [`Watch`], [`Watched`], [`watch`]  |
//! | **Sync callers**  | Same calls from code without a runtime.               | [`Watched::call_blocking`]         |
//! | **Configuration** | Limits and sampling rate, validated on build.         | [`WatchConfig`], [`WatchBuilder`]  |
//! | **Sampling**      | RSS of a process tree; pluggable backend.             | [`Sampler`], [`ProcessSampler`]    |
//! | **Errors**        | Limit violations vs. the operation's own errors.      | [`WatchError`], [`Violation`]      |
//!
//! ## Example
//! ```rust
//! use std::convert::Infallible;
//! use std::time::Duration;
//! use watchmen::{Watch, WatchError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let watch = Watch::builder()
//!         .max_time(Duration::from_secs(2))
//!         .max_memory_mb(512.0)
//!         .build()?;
//!
//!     let parse = watch.wrap(|s: String| s.parse::<u32>());
//!     assert_eq!(parse.call("42".to_string()).await?, 42);
//!
//!     match parse.call("nope".to_string()).await {
//!         Err(WatchError::Operation(e)) => println!("operation failed: {e}"),
//!         other => panic!("unexpected: {other:?}"),
//!     }
//!
//!     let quick = watch.run(|| Ok::<_, Infallible>("fast")).await?;
//!     assert_eq!(quick, "fast");
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod sampler;
mod watch;

// ---- Public re-exports ----

pub use config::{WatchConfig, DEFAULT_SAMPLE_INTERVAL};
pub use error::{ConfigError, SampleError, WatchError};
pub use events::Violation;
pub use sampler::{bytes_to_mb, ProcessSampler, Sampler, BYTES_PER_MB};
pub use watch::{watch, Watch, WatchBuilder, Watched};
