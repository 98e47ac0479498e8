//! # Run the supervised operation and report its outcome.
//!
//! The runner executes the caller's operation on its own schedule and reports
//! **exactly one** event to the result channel.
//!
//! ## Event flow
//! ```text
//! Ok(value)  ──► Event::Success(value)
//! Err(error) ──► Event::Error(error)      (error moved unchanged)
//! panic      ──► Event::Panicked(payload) (re-raised on the caller)
//! ```
//!
//! ## Rules
//! - Blocking operations get a dedicated, **detached** OS thread; async ones a tokio task.
//! - The operation is never interrupted: "cancelling" the runner only means nobody
//!   reads its event anymore.
//! - Reporting after the call resolved is dropped silently and never blocks.

use std::future::Future;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use futures::FutureExt;
use tracing::debug;

use crate::events::{Event, Reporter};

/// Thread name used for blocking operations.
const THREAD_NAME: &str = "watchmen-op";

/// Runs a blocking operation on a fresh detached thread.
///
/// Fails only if the OS refuses to create the thread; in that case nothing is reported.
pub(crate) fn spawn_blocking<T, E, F>(op: F, reporter: Reporter<T, E>) -> io::Result<()>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    thread::Builder::new()
        .name(THREAD_NAME.to_string())
        .spawn(move || {
            let ev = match panic::catch_unwind(AssertUnwindSafe(op)) {
                Ok(res) => outcome(res),
                Err(payload) => Event::Panicked(payload),
            };
            deliver(&reporter, ev);
        })?;
    Ok(())
}

/// Runs an async operation on a spawned tokio task.
pub(crate) fn spawn_async<T, E, Fut>(fut: Fut, reporter: Reporter<T, E>)
where
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    tokio::spawn(async move {
        let ev = match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(res) => outcome(res),
            Err(payload) => Event::Panicked(payload),
        };
        deliver(&reporter, ev);
    });
}

fn outcome<T, E>(res: Result<T, E>) -> Event<T, E> {
    match res {
        Ok(v) => Event::Success(v),
        Err(e) => Event::Error(e),
    }
}

fn deliver<T, E>(reporter: &Reporter<T, E>, ev: Event<T, E>) {
    let label = ev.as_label();
    if !reporter.report(ev) {
        debug!(outcome = label, "operation finished after the call was resolved");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::channel;
    use std::time::Duration;

    #[tokio::test]
    async fn blocking_success_is_reported_once() {
        let (reporter, mut rx) = channel::<u32, String>();
        spawn_blocking(|| Ok(5), reporter).expect("spawn");

        assert!(matches!(rx.recv().await, Some(Event::Success(5))));
        // Runner dropped its sender: channel is closed after the single event.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn blocking_error_is_moved_unchanged() {
        let (reporter, mut rx) = channel::<(), String>();
        spawn_blocking(|| Err("boom".to_string()), reporter).expect("spawn");

        match rx.recv().await {
            Some(Event::Error(e)) => assert_eq!(e, "boom"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn blocking_panic_carries_payload() {
        let (reporter, mut rx) = channel::<(), ()>();
        spawn_blocking(|| panic!("kaput"), reporter).expect("spawn");

        match rx.recv().await {
            Some(Event::Panicked(p)) => assert_eq!(p.downcast_ref::<&str>(), Some(&"kaput")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    async fn explode() -> Result<u8, u8> {
        panic!("async kaput")
    }

    #[tokio::test]
    async fn async_outcomes() {
        let (reporter, mut rx) = channel::<u8, u8>();
        spawn_async(
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Err(3)
            },
            reporter.clone(),
        );
        spawn_async(explode(), reporter);

        let mut labels = vec![];
        while let Some(ev) = rx.recv().await {
            labels.push(ev.as_label());
        }
        labels.sort_unstable();
        assert_eq!(labels, vec!["error", "panicked"]);
    }

    #[tokio::test]
    async fn late_report_does_not_block_the_runner() {
        let (reporter, rx) = channel::<(), ()>();
        drop(rx);
        let (done_tx, done_rx) = tokio::sync::oneshot::channel();
        spawn_blocking(
            move || {
                let _ = done_tx.send(());
                Ok(())
            },
            reporter,
        )
        .expect("spawn");
        assert!(done_rx.await.is_ok());
    }
}
