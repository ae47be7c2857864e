//! Google Gemini adapter

use crate::ports::{LlmError, TextGenerator};
use async_trait::async_trait;
use reqwest::Client;
use samarth_core::error::{Result, SamarthError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini text generator
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

/// Gemini API request format
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

/// Gemini API response format
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
}

impl GeminiGenerator {
    /// Create a new Gemini generator
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(SamarthError::ConfigMissing {
                key: "llm_api_key".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SamarthError::ConfigInvalid {
                key: "llm".to_string(),
                reason: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            api_key,
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
            client,
        })
    }

    /// Point the generator at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            self.api_key
        )
    }

    fn redacted(&self, url: &str) -> String {
        url.replace(&self.api_key, "***")
    }
}

/// Map an HTTP status and body from `generateContent` to text or a typed error
pub(crate) fn interpret_response(status: u16, body: &str) -> std::result::Result<String, LlmError> {
    if status == 429 {
        return Err(LlmError::RateLimit(excerpt(body)));
    }

    if !(200..300).contains(&status) {
        return Err(LlmError::Api(format!("HTTP {}: {}", status, excerpt(body))));
    }

    let response: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::Api(format!("Failed to parse Gemini response: {}", e)))?;

    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.clone())
    {
        return Err(LlmError::Blocked(reason));
    }

    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| LlmError::Api("No candidates in response".to_string()))?;

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(LlmError::Blocked("finish reason SAFETY".to_string()));
    }

    let text: String = candidate
        .content
        .iter()
        .flat_map(|content| content.parts.iter())
        .filter_map(|part| part.text.as_deref())
        .collect();

    if text.trim().is_empty() {
        return Err(LlmError::Api("Empty response text".to_string()));
    }

    if let Some(usage) = &response.usage_metadata {
        debug!(
            prompt_tokens = ?usage.prompt_token_count,
            response_tokens = ?usage.candidates_token_count,
            "Gemini usage"
        );
    }

    Ok(text)
}

fn excerpt(body: &str) -> String {
    body.chars().take(300).collect()
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn complete(&self, prompt: &str) -> std::result::Result<String, LlmError> {
        let request_body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GeminiGenerationConfig {
                temperature: 0.2,
                max_output_tokens: 1024,
            }),
        };

        let url = self.endpoint();
        debug!("Sending request to Gemini API: {}", self.redacted(&url));

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                let message = self.redacted(&e.to_string());
                if e.is_timeout() {
                    LlmError::Timeout(message)
                } else {
                    LlmError::Api(message)
                }
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            let message = self.redacted(&e.to_string());
            if e.is_timeout() {
                LlmError::Timeout(message)
            } else {
                LlmError::Api(message)
            }
        })?;

        match interpret_response(status, &body) {
            Ok(text) => {
                info!(model = %self.model, chars = text.len(), "Gemini response received");
                Ok(text)
            }
            Err(e) => {
                error!(model = %self.model, status, kind = %e.kind(), "Gemini API error");
                Err(e)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
