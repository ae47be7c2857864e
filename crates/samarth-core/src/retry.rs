//! Exponential backoff with jitter, shared by the data fetchers and the LLM calls

use async_trait::async_trait;
use rand::Rng;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep on the normal backoff curve and try again
    Backoff,
    /// Sleep twice as long (delay and cap both doubled) and try again
    ExtendedBackoff,
    /// Give up immediately
    Stop,
}

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,

    /// Base delay for the first retry
    pub initial_delay: Duration,

    /// Upper bound of the uniform random jitter added to every delay
    pub jitter: Duration,

    /// Maximum delay between attempts
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            jitter: Duration::from_secs(2),
            max_delay: Duration::from_secs(15),
        }
    }
}

/// Returned when no attempt succeeded
#[derive(Debug, Clone, PartialEq)]
pub enum RetryError<E> {
    /// Every allowed attempt failed with a retryable error
    Exhausted { attempts: u32, last: E },
    /// The classifier stopped retrying
    Aborted { attempts: u32, last: E },
}

impl<E> RetryError<E> {
    /// The error from the final attempt
    pub fn last(&self) -> &E {
        match self {
            RetryError::Exhausted { last, .. } | RetryError::Aborted { last, .. } => last,
        }
    }

    pub fn into_last(self) -> E {
        match self {
            RetryError::Exhausted { last, .. } | RetryError::Aborted { last, .. } => last,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } | RetryError::Aborted { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Exhausted { attempts, last } => {
                write!(f, "gave up after {} attempts: {}", attempts, last)
            }
            RetryError::Aborted { attempts, last } => {
                write!(f, "stopped after attempt {}: {}", attempts, last)
            }
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryError<E> {}

/// Port for waiting between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            ..Self::default()
        }
    }

    /// Policy for data portal requests
    pub fn for_data_api(max_attempts: u32, initial_delay: Duration) -> Self {
        Self::new(max_attempts, initial_delay)
    }

    /// Policy for LLM calls
    pub fn for_llm(max_attempts: u32, initial_delay: Duration) -> Self {
        Self::new(max_attempts, initial_delay)
    }

    /// Deterministic part of the delay: `initial_delay * 2^attempt`
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(31));
        self.initial_delay.saturating_mul(factor)
    }

    fn jitter_sample(&self) -> Duration {
        if self.jitter.is_zero() {
            return Duration::ZERO;
        }
        let secs = rand::thread_rng().gen_range(0.0..=self.jitter.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    /// Calculate the delay after a failed attempt (0-indexed)
    ///
    /// Formula: min(initial_delay * 2^attempt + uniform(0, jitter), max_delay)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        (self.base_delay(attempt) + self.jitter_sample()).min(self.max_delay)
    }

    fn delay_for(&self, attempt: u32, decision: RetryDecision) -> Duration {
        match decision {
            RetryDecision::ExtendedBackoff => (self.base_delay(attempt).saturating_mul(2)
                + self.jitter_sample())
            .min(self.max_delay.saturating_mul(2)),
            _ => self.delay_for_attempt(attempt),
        }
    }

    /// Run `operation` with exponential backoff, sleeping on the tokio timer
    pub async fn execute<T, E, F, Fut, C>(
        &self,
        operation: F,
        classify: C,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E, u32) -> RetryDecision,
        E: fmt::Display,
    {
        self.execute_with(&TokioSleeper, operation, classify).await
    }

    /// Run `operation` with exponential backoff using the given sleeper
    ///
    /// `classify` receives the error and the 0-indexed attempt that produced it.
    pub async fn execute_with<T, E, F, Fut, C, S>(
        &self,
        sleeper: &S,
        mut operation: F,
        classify: C,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E, u32) -> RetryDecision,
        E: fmt::Display,
        S: Sleeper + ?Sized,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            let decision = classify(&error, attempt);
            let attempts = attempt + 1;

            if decision == RetryDecision::Stop {
                tracing::debug!(attempt = attempts, error = %error, "Not retrying");
                return Err(RetryError::Aborted { attempts, last: error });
            }

            if attempts >= max_attempts {
                tracing::warn!(attempts, error = %error, "Retries exhausted");
                return Err(RetryError::Exhausted { attempts, last: error });
            }

            let delay = self.delay_for(attempt, decision);
            tracing::info!(
                attempt = attempts,
                max_attempts,
                delay_secs = delay.as_secs_f64(),
                error = %error,
                "Attempt failed, backing off"
            );
            sleeper.sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_secs(2));
        assert_eq!(policy.max_delay, Duration::from_secs(15));
    }

    #[test]
    fn test_delay_bounds() {
        let policy = RetryPolicy::default();

        for attempt in 0..3 {
            let delay = policy.delay_for_attempt(attempt);
            let base = Duration::from_secs(2 * 2u64.pow(attempt));
            assert!(delay >= base, "attempt {} delay {:?} below {:?}", attempt, delay, base);
            assert!(delay <= base + Duration::from_secs(2));
        }
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(10), Duration::from_secs(15));
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::from_secs(15));
    }

    #[test]
    fn test_extended_backoff_is_longer() {
        let policy = RetryPolicy {
            jitter: Duration::ZERO,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(1, RetryDecision::Backoff), Duration::from_secs(4));
        assert_eq!(policy.delay_for(1, RetryDecision::ExtendedBackoff), Duration::from_secs(8));
        assert_eq!(policy.delay_for(5, RetryDecision::ExtendedBackoff), Duration::from_secs(30));
    }

    #[test]
    fn test_retry_error_accessors() {
        let err: RetryError<String> = RetryError::Exhausted {
            attempts: 3,
            last: "timeout".to_string(),
        };
        assert!(err.is_exhausted());
        assert_eq!(err.attempts(), 3);
        assert_eq!(err.last(), "timeout");
        assert_eq!(err.to_string(), "gave up after 3 attempts: timeout");
    }
}
