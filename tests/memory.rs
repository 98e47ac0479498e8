//! Memory-limit scenarios. Kept in their own test binary so the large allocation
//! does not inflate the RSS seen by other tests.
//!
//! Tests that read the real RSS of this process hold [`SERIAL`], so one test's
//! allocation never counts against another's ceiling.

use std::convert::Infallible;
use std::sync::{mpsc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use watchmen::{SampleError, Sampler, Violation, Watch, WatchError};

const MB: usize = 1024 * 1024;

static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn memory_limit_reports_measured_rss() {
    let _serial = serial();
    let watch = Watch::builder()
        .max_memory_mb(100.0)
        .sample_rate(Duration::from_millis(50))
        .build()
        .expect("valid config");

    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    let (freed_tx, freed_rx) = mpsc::channel::<()>();
    let err = watch
        .run(move || {
            // Non-zero fill so every page is touched and resident.
            let block = vec![1u8; 300 * MB];
            let _ = stop_rx.recv_timeout(Duration::from_secs(5));
            let len = block.len();
            drop(block);
            let _ = freed_tx.send(());
            Ok::<_, Infallible>(len)
        })
        .await
        .expect_err("must exceed memory limit");

    // The operation outlives the call; release its memory before the next test.
    let _ = stop_tx.send(());
    let _ = freed_rx.recv_timeout(Duration::from_secs(10));

    match &err {
        WatchError::LimitExceeded(Violation::Memory { rss_mb, limit_mb }) => {
            assert_eq!(*limit_mb, 100.0);
            assert!(*rss_mb > 100.0, "measured {rss_mb} MB");
            assert!(*rss_mb < 600.0, "measured {rss_mb} MB for a 300 MB block");
        }
        other => panic!("unexpected: {other:?}"),
    }
    let msg = err.to_string();
    assert!(msg.starts_with("Memory limit exceeded. RSS: "), "{msg}");
    assert!(msg.ends_with(" MB"), "{msg}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn threaded_operation_under_ceiling_is_not_tripped() {
    let _serial = serial();
    let watch = Watch::builder()
        .max_memory_mb(200.0)
        .sample_rate(Duration::from_millis(20))
        .build()
        .expect("valid config");

    let out = watch
        .run(|| {
            let block = vec![1u8; 60 * MB];
            let workers: Vec<_> = (0..4)
                .map(|_| thread::spawn(|| thread::sleep(Duration::from_millis(500))))
                .collect();
            for w in workers {
                let _ = w.join();
            }
            Ok::<_, Infallible>(block.len())
        })
        .await;
    assert_eq!(out.ok(), Some(60 * MB));
}

/// Pretends the process tree always holds 512 MB.
struct Inflated;

impl Sampler for Inflated {
    fn is_running(&mut self, _pid: u32) -> bool {
        true
    }

    fn sample(&mut self, _pid: u32) -> Result<u64, SampleError> {
        Ok(512 * MB as u64)
    }
}

#[tokio::test]
async fn custom_sampler_drives_memory_watchdog() {
    let watch = Watch::builder()
        .max_memory_mb(256.0)
        .sample_rate(Duration::from_millis(10))
        .sampler(|| Inflated)
        .build()
        .expect("valid config");

    let err = watch
        .run(|| {
            thread::sleep(Duration::from_secs(2));
            Ok::<_, Infallible>(())
        })
        .await
        .expect_err("sampler reports more than the ceiling");
    assert_eq!(err.to_string(), "Memory limit exceeded. RSS: 512.00 MB");
    assert_eq!(err.violation().map(Violation::as_label), Some("memory"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn generous_memory_limit_returns_value() {
    let _serial = serial();
    let watch = Watch::builder()
        .max_memory_mb(200.0)
        .max_time(Duration::from_secs(30))
        .sample_rate(Duration::from_millis(20))
        .build()
        .expect("valid config");

    let out = watch
        .run(|| {
            thread::sleep(Duration::from_millis(200));
            Ok::<_, Infallible>(7)
        })
        .await;
    assert_eq!(out.ok(), Some(7));
}
