//! LLM port definitions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Machine-checkable category of an LLM failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmErrorKind {
    RateLimit,
    Timeout,
    Blocked,
    ApiError,
    MaxAttempts,
}

impl LlmErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmErrorKind::RateLimit => "rate_limit",
            LlmErrorKind::Timeout => "timeout",
            LlmErrorKind::Blocked => "blocked",
            LlmErrorKind::ApiError => "api_error",
            LlmErrorKind::MaxAttempts => "max_attempts",
        }
    }
}

impl fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from a text generation call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LlmError {
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Response blocked by safety filters: {0}")]
    Blocked(String),

    #[error("LLM API error: {0}")]
    Api(String),

    #[error("Gave up after {attempts} attempts: {last}")]
    MaxAttempts { attempts: u32, last: String },
}

impl LlmError {
    pub fn kind(&self) -> LlmErrorKind {
        match self {
            LlmError::RateLimit(_) => LlmErrorKind::RateLimit,
            LlmError::Timeout(_) => LlmErrorKind::Timeout,
            LlmError::Blocked(_) => LlmErrorKind::Blocked,
            LlmError::Api(_) => LlmErrorKind::ApiError,
            LlmError::MaxAttempts { .. } => LlmErrorKind::MaxAttempts,
        }
    }
}

/// Port for text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete a single prompt and return the response text
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Get the name/identifier of the model
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Box<T> {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).complete(prompt).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for std::sync::Arc<T> {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).complete(prompt).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
