#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))] // This is all test code, no need to test it.

//! Private helpers for testing the type pool and variant view packages.

use std::sync::{Arc, Barrier, mpsc};
use std::thread;
use std::time::Duration;

/// Runs a test with a timeout to prevent infinite hangs.
///
/// If the test takes longer than the timeout to complete, the test panics instead of letting
/// the build hang. The timeout is 10 seconds under normal conditions and 60 seconds under Miri,
/// where thread synchronization primitives are significantly slower.
///
/// When the `MUTATION_TESTING` environment variable is set to "1", the watchdog is disabled and
/// the test function is executed directly, so mutation testing can detect hanging mutations.
///
/// # Panics
///
/// Panics if the test exceeds the timeout or if the test itself panics.
///
/// # Example
///
/// ```rust
/// use testing::with_watchdog;
///
/// with_watchdog(|| {
///     assert_eq!(2 + 2, 4);
/// });
/// ```
#[cfg_attr(test, mutants::skip)] // Test logic, do not waste time mutating.
pub fn with_watchdog<F, R>(test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    if std::env::var("MUTATION_TESTING").as_deref() == Ok("1") {
        return test_fn();
    }

    let (tx, rx) = mpsc::channel();

    let test_handle = thread::spawn(move || {
        let result = test_fn();
        // If this fails, the receiver has already timed out.
        drop(tx.send(result));
    });

    let timeout = if cfg!(miri) {
        Duration::from_secs(60)
    } else {
        Duration::from_secs(10)
    };

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            test_handle.join().expect("Test thread should not panic");
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            panic!("Test exceeded {timeout:?} timeout");
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => match test_handle.join() {
            Ok(()) => panic!("Test thread disconnected unexpectedly"),
            Err(e) => std::panic::resume_unwind(e),
        },
    }
}

/// Runs `f` on `thread_count` threads that are all released at the same moment, returning the
/// results in thread index order.
///
/// All threads wait on a shared barrier before calling `f`, which maximizes the chance that
/// the calls actually overlap. This is how tests simulate many simultaneous first callers.
///
/// # Panics
///
/// Panics if any of the threads panics.
///
/// # Example
///
/// ```rust
/// use testing::run_concurrently;
///
/// let results = run_concurrently(4, |index| index * 2);
///
/// assert_eq!(results, vec![0, 2, 4, 6]);
/// ```
#[cfg_attr(test, mutants::skip)] // Test logic, do not waste time mutating.
pub fn run_concurrently<F, R>(thread_count: usize, f: F) -> Vec<R>
where
    F: Fn(usize) -> R + Send + Sync + 'static,
    R: Send + 'static,
{
    let barrier = Arc::new(Barrier::new(thread_count));
    let f = Arc::new(f);

    let handles = (0..thread_count)
        .map(|index| {
            let barrier = Arc::clone(&barrier);
            let f = Arc::clone(&f);

            thread::spawn(move || {
                barrier.wait();
                f(index)
            })
        })
        .collect::<Vec<_>>();

    handles
        .into_iter()
        .map(|handle| handle.join().expect("concurrent test thread panicked"))
        .collect()
}
