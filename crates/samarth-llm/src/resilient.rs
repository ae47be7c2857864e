//! Retry wrapper for text generators

use crate::ports::{LlmError, TextGenerator};
use async_trait::async_trait;
use samarth_core::retry::{RetryDecision, RetryError, RetryPolicy, Sleeper, TokioSleeper};
use std::sync::Arc;
use std::time::Duration;

/// Wraps a generator with the LLM retry discipline.
///
/// Rate limits back off on the extended curve, timeouts on the normal curve,
/// safety blocks stop immediately and any other error gets exactly one retry.
pub struct ResilientGenerator<G> {
    inner: G,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl<G: TextGenerator> ResilientGenerator<G> {
    pub fn new(inner: G, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Default LLM policy: 20 attempts starting at 2 seconds
    pub fn with_defaults(inner: G) -> Self {
        Self::new(inner, RetryPolicy::for_llm(20, Duration::from_secs(2)))
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }
}

/// Retry decision for an LLM error raised by the 0-indexed `attempt`
pub fn classify_llm_error(error: &LlmError, attempt: u32) -> RetryDecision {
    match error {
        LlmError::RateLimit(_) => RetryDecision::ExtendedBackoff,
        LlmError::Timeout(_) => RetryDecision::Backoff,
        LlmError::Blocked(_) | LlmError::MaxAttempts { .. } => RetryDecision::Stop,
        LlmError::Api(_) if attempt == 0 => RetryDecision::Backoff,
        LlmError::Api(_) => RetryDecision::Stop,
    }
}

#[async_trait]
impl<G: TextGenerator> TextGenerator for ResilientGenerator<G> {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let result = self
            .policy
            .execute_with(
                self.sleeper.as_ref(),
                || self.inner.complete(prompt),
                classify_llm_error,
            )
            .await;

        match result {
            Ok(text) => Ok(text),
            Err(RetryError::Exhausted { attempts, last }) => Err(LlmError::MaxAttempts {
                attempts,
                last: last.to_string(),
            }),
            Err(RetryError::Aborted { last, .. }) => Err(last),
        }
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
