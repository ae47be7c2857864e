//! Retry loop behavior with a recording sleeper

use async_trait::async_trait;
use samarth_core::retry::{RetryDecision, RetryError, RetryPolicy, Sleeper};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

#[tokio::test]
async fn test_two_timeouts_then_success() {
    let policy = RetryPolicy::for_data_api(3, Duration::from_secs(2));
    let sleeper = RecordingSleeper::default();
    let calls = AtomicU32::new(0);

    let result = policy
        .execute_with(
            &sleeper,
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err("timeout".to_string())
                    } else {
                        Ok(42)
                    }
                }
            },
            |_, _| RetryDecision::Backoff,
        )
        .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let sleeps = sleeper.recorded();
    assert_eq!(sleeps.len(), 2);
    for (k, delay) in sleeps.iter().enumerate() {
        let base = Duration::from_secs(2 * 2u64.pow(k as u32));
        assert!(*delay >= base, "sleep {} was {:?}", k, delay);
        assert!(*delay <= base + Duration::from_secs(2), "sleep {} was {:?}", k, delay);
    }
}

#[tokio::test]
async fn test_exhausted_after_max_attempts() {
    let policy = RetryPolicy::for_data_api(3, Duration::from_secs(2));
    let sleeper = RecordingSleeper::default();
    let calls = AtomicU32::new(0);

    let result: Result<(), RetryError<String>> = policy
        .execute_with(
            &sleeper,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("status 503".to_string()) }
            },
            |_, _| RetryDecision::Backoff,
        )
        .await;

    let err = result.unwrap_err();
    assert!(err.is_exhausted());
    assert_eq!(err.attempts(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // No sleep after the final attempt
    assert_eq!(sleeper.recorded().len(), 2);
}

#[tokio::test]
async fn test_stop_aborts_without_sleeping() {
    let policy = RetryPolicy::for_llm(20, Duration::from_secs(2));
    let sleeper = RecordingSleeper::default();
    let calls = AtomicU32::new(0);

    let result: Result<(), RetryError<String>> = policy
        .execute_with(
            &sleeper,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("blocked".to_string()) }
            },
            |_, _| RetryDecision::Stop,
        )
        .await;

    let err = result.unwrap_err();
    assert!(!err.is_exhausted());
    assert_eq!(err.attempts(), 1);
    assert_eq!(err.into_last(), "blocked");
    assert!(sleeper.recorded().is_empty());
}

#[tokio::test]
async fn test_classifier_sees_attempt_index() {
    let policy = RetryPolicy::for_llm(20, Duration::from_secs(2));
    let sleeper = RecordingSleeper::default();
    let calls = AtomicU32::new(0);

    // Retry only the first failure, as for unclassified LLM errors
    let result: Result<(), RetryError<String>> = policy
        .execute_with(
            &sleeper,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("api error".to_string()) }
            },
            |_, attempt| {
                if attempt == 0 {
                    RetryDecision::Backoff
                } else {
                    RetryDecision::Stop
                }
            },
        )
        .await;

    assert_eq!(result.unwrap_err().attempts(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(sleeper.recorded().len(), 1);
}

#[tokio::test]
async fn test_extended_backoff_sleeps_longer() {
    let policy = RetryPolicy {
        jitter: Duration::ZERO,
        ..RetryPolicy::for_llm(3, Duration::from_secs(2))
    };
    let sleeper = RecordingSleeper::default();

    let _: Result<(), RetryError<String>> = policy
        .execute_with(
            &sleeper,
            || async { Err("rate limit".to_string()) },
            |_, _| RetryDecision::ExtendedBackoff,
        )
        .await;

    assert_eq!(
        sleeper.recorded(),
        vec![Duration::from_secs(4), Duration::from_secs(8)]
    );
}
