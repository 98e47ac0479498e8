//! # Example: limits
//!
//! Runs three operations under supervision and prints how each call ended.
//!
//! Demonstrates how to:
//! - Configure a [`Watch`] with a time limit and a memory limit.
//! - Wrap a reusable operation with [`Watch::wrap`].
//! - Tell a limit violation apart from the operation's own error.
//!
//! ## Flow
//! ```text
//! Watch::builder().max_time(1s).max_memory_mb(200).build()
//!     ├─► nap(300ms)    → returns before any watchdog trips
//!     ├─► nap(5s)       → TimeWatchdog trips → "Time limit exceeded"
//!     └─► hog(400 MB)   → MemoryWatchdog trips → "Memory limit exceeded. RSS: ... MB"
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=watchmen=debug cargo run --example limits
//! ```

use std::convert::Infallible;
use std::thread;
use std::time::Duration;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use watchmen::{Watch, WatchError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().compact())
        .init();

    // 1. Limits shared by every call
    let watch = Watch::builder()
        .max_time(Duration::from_secs(1))
        .max_memory_mb(200.0)
        .sample_rate(Duration::from_millis(100))
        .build()?;

    // 2. A reusable, blocking operation
    let nap = watch.wrap(|ms: u64| {
        thread::sleep(Duration::from_millis(ms));
        Ok::<_, Infallible>(ms)
    });

    for ms in [300, 5_000] {
        match nap.call(ms).await {
            Ok(v) => println!("[nap {ms}ms] returned {v}"),
            Err(e) => println!("[nap {ms}ms] {} ({})", e, e.as_label()),
        }
    }

    // 3. A one-shot operation that allocates
    let hog = watch
        .run(|| {
            let block = vec![7u8; 400 * 1024 * 1024];
            thread::sleep(Duration::from_secs(3));
            Ok::<_, Infallible>(block.len())
        })
        .await;
    match hog {
        Ok(n) => println!("[hog] kept {n} bytes"),
        Err(WatchError::LimitExceeded(v)) => println!("[hog] {v}"),
        Err(e) => println!("[hog] failed: {e}"),
    }

    // Watchdogs stop watching; they do not stop the operations themselves.
    Ok(())
}
