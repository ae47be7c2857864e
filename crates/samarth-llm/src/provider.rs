//! Provider spec parsing and generator construction

use crate::gemini::GeminiGenerator;
use crate::ollama::OllamaGenerator;
use crate::ports::TextGenerator;
use crate::resilient::ResilientGenerator;
use samarth_core::config::LayeredConfig;
use samarth_core::error::{Result, SamarthError};
use samarth_core::retry::RetryPolicy;
use std::fmt;
use std::time::Duration;

const SUPPORTED: &str = "gemini:<model> or ollama:<model>, e.g. gemini:gemini-2.0-flash";

/// A parsed `provider:model` string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSpec {
    Gemini { model: String },
    Ollama { model: String },
}

impl ProviderSpec {
    pub fn parse(spec: &str) -> Result<Self> {
        let (provider, model) = spec.trim().split_once(':').ok_or_else(|| {
            SamarthError::UnknownProvider {
                provider: spec.to_string(),
                remediation: SUPPORTED.to_string(),
            }
        })?;

        let model = model.trim();
        if model.is_empty() {
            return Err(SamarthError::ConfigInvalid {
                key: "llm".to_string(),
                reason: format!("No model named in '{}'. Use {}", spec, SUPPORTED),
            });
        }

        match provider.trim().to_lowercase().as_str() {
            "gemini" => Ok(ProviderSpec::Gemini {
                model: model.to_string(),
            }),
            "ollama" => Ok(ProviderSpec::Ollama {
                model: model.to_string(),
            }),
            other => Err(SamarthError::UnknownProvider {
                provider: other.to_string(),
                remediation: SUPPORTED.to_string(),
            }),
        }
    }

    pub fn provider(&self) -> &'static str {
        match self {
            ProviderSpec::Gemini { .. } => "gemini",
            ProviderSpec::Ollama { .. } => "ollama",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ProviderSpec::Gemini { model } | ProviderSpec::Ollama { model } => model,
        }
    }
}

impl fmt::Display for ProviderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider(), self.model())
    }
}

/// Settings needed to build a generator
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub spec: String,
    pub api_key: String,
    pub ollama_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl GeneratorSettings {
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self {
            spec: config.llm.value.clone(),
            api_key: config.llm_api_key.value.clone(),
            ollama_url: config.ollama_url.value.clone(),
            timeout: config.api_timeout(),
            retry: config.llm_retry_policy(),
        }
    }
}

/// Build the configured generator wrapped in the LLM retry policy
pub fn create_generator(settings: &GeneratorSettings) -> Result<Box<dyn TextGenerator>> {
    let generator: Box<dyn TextGenerator> = match ProviderSpec::parse(&settings.spec)? {
        ProviderSpec::Gemini { model } => Box::new(ResilientGenerator::new(
            GeminiGenerator::new(settings.api_key.clone(), model, settings.timeout)?,
            settings.retry.clone(),
        )),
        ProviderSpec::Ollama { model } => Box::new(ResilientGenerator::new(
            OllamaGenerator::new(settings.ollama_url.clone(), model, settings.timeout),
            settings.retry.clone(),
        )),
    };

    tracing::info!(llm = %settings.spec, "Text generator ready");
    Ok(generator)
}
