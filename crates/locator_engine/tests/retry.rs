use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use locator_core::{ConfigError, FailureKind, FetchError, FetchOutcome, RetryPolicy};
use locator_engine::{fetch_with_retry, Retrier};
use pretty_assertions::assert_eq;
use tokio::time::Instant;

fn retrier(max_attempts: u32) -> Retrier {
    Retrier::new(RetryPolicy::new(max_attempts, Duration::from_secs(2)).unwrap()).unwrap()
}

fn timeout() -> FetchError {
    FetchError::new(FailureKind::Timeout, "slow upstream")
}

#[tokio::test(start_paused = true)]
async fn transient_failures_consume_the_whole_budget() {
    let calls = AtomicU32::new(0);
    let started = Instant::now();

    let outcome = retrier(3)
        .run("always slow", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<u32, _>(timeout()) }
        })
        .await;

    assert_eq!(
        outcome,
        FetchOutcome::Failure {
            reason: timeout(),
            attempts: 3
        }
    );
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // Two pauses between three attempts, none after the last one.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(4), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(6), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn success_after_transient_failures_is_returned() {
    let calls = AtomicU32::new(0);

    let outcome = retrier(5)
        .run("flaky", || {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if call < 3 {
                    Err(FetchError::new(FailureKind::HttpStatus(503), "unavailable"))
                } else {
                    Ok(call)
                }
            }
        })
        .await;

    assert_eq!(outcome, FetchOutcome::Success(3));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn non_transient_failure_is_not_retried() {
    let calls = AtomicU32::new(0);
    let started = Instant::now();

    let outcome = retrier(5)
        .run("missing", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<u32, _>(FetchError::new(FailureKind::HttpStatus(404), "gone")) }
        })
        .await;

    assert_eq!(outcome.attempts(), Some(1));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn single_attempt_budget_never_sleeps() {
    let started = Instant::now();
    let outcome = retrier(1)
        .run("once", || async { Err::<u32, _>(timeout()) })
        .await;

    assert_eq!(outcome.attempts(), Some(1));
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test]
async fn zero_attempt_budget_is_rejected_before_any_call() {
    let calls = AtomicU32::new(0);
    let policy = RetryPolicy {
        max_attempts: 0,
        backoff: Duration::from_secs(1),
    };

    let result = fetch_with_retry(policy, "never", || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Ok::<u32, FetchError>(1) }
    })
    .await;

    assert_eq!(result, Err(ConfigError::InvalidRetryBudget));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
