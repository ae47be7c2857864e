use crate::ports::{LlmError, TextGenerator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama generator implementation
pub struct OllamaGenerator {
    /// Base URL for Ollama API (e.g., "http://localhost:11434")
    base_url: String,

    /// Model name to use for generation
    model: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OllamaGenerator {
    /// Create a new Ollama generator
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into(),
            model: model.into(),
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(format!("Ollama at {} did not respond: {}", self.base_url, e))
                } else {
                    LlmError::Api(format!(
                        "Failed to connect to Ollama: {}. Ensure Ollama is running at {} and run 'ollama pull {}'",
                        e, self.base_url, self.model
                    ))
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(LlmError::RateLimit(format!("Ollama returned {}", status)));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!(
                "Ollama API error ({}): {}. Run 'ollama list' to see installed models",
                status, error_text
            )));
        }

        let generate_response: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Api(format!("Failed to parse Ollama response: {}", e)))?;

        tracing::debug!(model = %self.model, chars = generate_response.response.len(), "Ollama response received");

        Ok(generate_response.response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Request body for Ollama generate API
#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// Response from Ollama generate API
#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_generator_creation() {
        let generator =
            OllamaGenerator::new("http://localhost:11434", "llama3", Duration::from_secs(120));
        assert_eq!(generator.model_name(), "llama3");
        assert_eq!(generator.endpoint(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn test_ollama_generator_custom_url() {
        let generator = OllamaGenerator::new("http://custom:11434/", "mistral", Duration::from_secs(5));
        assert_eq!(generator.base_url, "http://custom:11434/");
        assert_eq!(generator.endpoint(), "http://custom:11434/api/generate");
    }

    #[test]
    fn test_request_disables_streaming() {
        let request = OllamaGenerateRequest {
            model: "llama3".to_string(),
            prompt: "hello".to_string(),
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
    }
}
