use crate::error::{Result, SamarthError};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const RAINFALL_ANNUAL_API: &str =
    "https://api.data.gov.in/resource/294a162a-92fb-4939-af88-e69bd84049f1";
pub const CROP_PRODUCTION_API: &str =
    "https://api.data.gov.in/resource/35be999b-0208-4354-b557-f6ca9a5355de";
pub const WATER_USAGE_API: &str =
    "https://api.data.gov.in/resource/50bc5a96-d6d5-483e-92b1-2d8fe09f0a0d";

pub const DEFAULT_LLM: &str = "gemini:gemini-2.0-flash";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has at least the same precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() >= self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Dataset endpoint URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub rainfall: String,
    pub crop_production: String,
    pub water_usage: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            rainfall: RAINFALL_ANNUAL_API.to_string(),
            crop_production: CROP_PRODUCTION_API.to_string(),
            water_usage: WATER_USAGE_API.to_string(),
        }
    }
}

/// Layered configuration for SAMARTH
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub data_api_key: ConfigValue<String>,
    pub llm_api_key: ConfigValue<String>,
    pub llm: ConfigValue<String>,
    pub ollama_url: ConfigValue<String>,
    pub api_timeout_secs: ConfigValue<u64>,
    pub api_retry_attempts: ConfigValue<u32>,
    pub api_retry_delay_secs: ConfigValue<u64>,
    pub llm_max_attempts: ConfigValue<u32>,
    pub llm_initial_delay_secs: ConfigValue<u64>,
    pub cache_ttl_secs: ConfigValue<u64>,
    pub enable_caching: ConfigValue<bool>,
    pub show_api_urls: ConfigValue<bool>,
    pub endpoints: ConfigValue<Endpoints>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            data_api_key: ConfigValue::new(String::new(), ConfigSource::Default),
            llm_api_key: ConfigValue::new(String::new(), ConfigSource::Default),
            llm: ConfigValue::new(DEFAULT_LLM.to_string(), ConfigSource::Default),
            ollama_url: ConfigValue::new(DEFAULT_OLLAMA_URL.to_string(), ConfigSource::Default),
            api_timeout_secs: ConfigValue::new(30, ConfigSource::Default),
            api_retry_attempts: ConfigValue::new(3, ConfigSource::Default),
            api_retry_delay_secs: ConfigValue::new(2, ConfigSource::Default),
            llm_max_attempts: ConfigValue::new(20, ConfigSource::Default),
            llm_initial_delay_secs: ConfigValue::new(2, ConfigSource::Default),
            cache_ttl_secs: ConfigValue::new(86_400, ConfigSource::Default),
            enable_caching: ConfigValue::new(true, ConfigSource::Default),
            show_api_urls: ConfigValue::new(true, ConfigSource::Default),
            endpoints: ConfigValue::new(Endpoints::default(), ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| SamarthError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| SamarthError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        let source = ConfigSource::File;

        if let Some(v) = file_config.data_api_key {
            self.data_api_key.update(v, source);
        }
        if let Some(v) = file_config.llm_api_key {
            self.llm_api_key.update(v, source);
        }
        if let Some(v) = file_config.llm {
            self.llm.update(v, source);
        }
        if let Some(v) = file_config.ollama_url {
            self.ollama_url.update(v, source);
        }
        if let Some(v) = file_config.api_timeout_secs {
            self.api_timeout_secs.update(v, source);
        }
        if let Some(v) = file_config.api_retry_attempts {
            self.api_retry_attempts.update(v, source);
        }
        if let Some(v) = file_config.api_retry_delay_secs {
            self.api_retry_delay_secs.update(v, source);
        }
        if let Some(v) = file_config.llm_max_attempts {
            self.llm_max_attempts.update(v, source);
        }
        if let Some(v) = file_config.llm_initial_delay_secs {
            self.llm_initial_delay_secs.update(v, source);
        }
        if let Some(v) = file_config.cache_ttl_secs {
            self.cache_ttl_secs.update(v, source);
        }
        if let Some(v) = file_config.enable_caching {
            self.enable_caching.update(v, source);
        }
        if let Some(v) = file_config.show_api_urls {
            self.show_api_urls.update(v, source);
        }

        let mut endpoints = self.endpoints.value.clone();
        let mut endpoints_changed = false;
        if let Some(v) = file_config.rainfall_url {
            endpoints.rainfall = v;
            endpoints_changed = true;
        }
        if let Some(v) = file_config.crop_production_url {
            endpoints.crop_production = v;
            endpoints_changed = true;
        }
        if let Some(v) = file_config.water_usage_url {
            endpoints.water_usage = v;
            endpoints_changed = true;
        }
        if endpoints_changed {
            self.endpoints.update(endpoints, source);
        }

        Ok(self)
    }

    /// Load the file only when it exists
    pub fn load_from_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        if path.as_ref().exists() {
            self.load_from_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        let source = ConfigSource::Environment;

        // SAMARTH_DATA_API_KEY, falling back to API_KEY
        if let Some(key) = first_env(&["SAMARTH_DATA_API_KEY", "API_KEY"]) {
            self.data_api_key.update(key, source);
        }

        // SAMARTH_LLM_API_KEY, falling back to GEMINI_KEY
        if let Some(key) = first_env(&["SAMARTH_LLM_API_KEY", "GEMINI_KEY"]) {
            self.llm_api_key.update(key, source);
        }

        if let Ok(llm) = env::var("SAMARTH_LLM") {
            self.llm.update(llm, source);
        }

        if let Ok(url) = env::var("SAMARTH_OLLAMA_URL") {
            self.ollama_url.update(url, source);
        }

        env_parsed("SAMARTH_API_TIMEOUT", &mut self.api_timeout_secs);
        env_parsed("SAMARTH_API_RETRY_ATTEMPTS", &mut self.api_retry_attempts);
        env_parsed("SAMARTH_API_RETRY_DELAY", &mut self.api_retry_delay_secs);
        env_parsed("SAMARTH_LLM_MAX_ATTEMPTS", &mut self.llm_max_attempts);
        env_parsed("SAMARTH_LLM_INITIAL_DELAY", &mut self.llm_initial_delay_secs);
        env_parsed("SAMARTH_CACHE_TTL", &mut self.cache_ttl_secs);

        if let Ok(value) = env::var("SAMARTH_ENABLE_CACHING") {
            match parse_bool(&value) {
                Ok(v) => self.enable_caching.update(v, source),
                Err(_) => tracing::warn!(
                    "Invalid SAMARTH_ENABLE_CACHING value '{}': expected true or false",
                    value
                ),
            }
        }

        if let Ok(value) = env::var("SAMARTH_SHOW_API_URLS") {
            match parse_bool(&value) {
                Ok(v) => self.show_api_urls.update(v, source),
                Err(_) => tracing::warn!(
                    "Invalid SAMARTH_SHOW_API_URLS value '{}': expected true or false",
                    value
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(llm) = overrides.llm {
            self.llm.update(llm, ConfigSource::Cli);
        }

        if overrides.no_cache {
            self.enable_caching.update(false, ConfigSource::Cli);
        }
    }

    /// Warn about missing keys without failing the load
    pub fn warn_missing_keys(&self) {
        if self.data_api_key.value.is_empty() {
            tracing::warn!("data_api_key not set; set SAMARTH_DATA_API_KEY or API_KEY");
        }
        if self.llm_api_key.value.is_empty() && self.llm.value.starts_with("gemini") {
            tracing::warn!("llm_api_key not set; set SAMARTH_LLM_API_KEY or GEMINI_KEY");
        }
    }

    /// The data portal key, or an error naming the missing setting
    pub fn require_data_api_key(&self) -> Result<&str> {
        if self.data_api_key.value.is_empty() {
            return Err(SamarthError::ConfigMissing {
                key: "data_api_key".to_string(),
            });
        }
        Ok(&self.data_api_key.value)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs.value)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs.value)
    }

    /// Retry policy for data portal requests
    pub fn data_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::for_data_api(
            self.api_retry_attempts.value,
            Duration::from_secs(self.api_retry_delay_secs.value),
        )
    }

    /// Retry policy for LLM calls
    pub fn llm_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::for_llm(
            self.llm_max_attempts.value,
            Duration::from_secs(self.llm_initial_delay_secs.value),
        )
    }

    /// Get all configuration values as a map for inspection (keys masked)
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "data_api_key".to_string(),
            (mask_secret(&self.data_api_key.value), self.data_api_key.source),
        );
        map.insert(
            "llm_api_key".to_string(),
            (mask_secret(&self.llm_api_key.value), self.llm_api_key.source),
        );
        map.insert("llm".to_string(), (self.llm.value.clone(), self.llm.source));
        map.insert("ollama_url".to_string(), (self.ollama_url.value.clone(), self.ollama_url.source));
        map.insert(
            "api_timeout_secs".to_string(),
            (self.api_timeout_secs.value.to_string(), self.api_timeout_secs.source),
        );
        map.insert(
            "api_retry_attempts".to_string(),
            (self.api_retry_attempts.value.to_string(), self.api_retry_attempts.source),
        );
        map.insert(
            "api_retry_delay_secs".to_string(),
            (self.api_retry_delay_secs.value.to_string(), self.api_retry_delay_secs.source),
        );
        map.insert(
            "llm_max_attempts".to_string(),
            (self.llm_max_attempts.value.to_string(), self.llm_max_attempts.source),
        );
        map.insert(
            "llm_initial_delay_secs".to_string(),
            (self.llm_initial_delay_secs.value.to_string(), self.llm_initial_delay_secs.source),
        );
        map.insert(
            "cache_ttl_secs".to_string(),
            (self.cache_ttl_secs.value.to_string(), self.cache_ttl_secs.source),
        );
        map.insert(
            "enable_caching".to_string(),
            (self.enable_caching.value.to_string(), self.enable_caching.source),
        );
        map.insert(
            "show_api_urls".to_string(),
            (self.show_api_urls.value.to_string(), self.show_api_urls.source),
        );
        map.insert(
            "rainfall_url".to_string(),
            (self.endpoints.value.rainfall.clone(), self.endpoints.source),
        );
        map.insert(
            "crop_production_url".to_string(),
            (self.endpoints.value.crop_production.clone(), self.endpoints.source),
        );
        map.insert(
            "water_usage_url".to_string(),
            (self.endpoints.value.water_usage.clone(), self.endpoints.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Default, Deserialize, Serialize)]
struct FileConfig {
    data_api_key: Option<String>,
    llm_api_key: Option<String>,
    llm: Option<String>,
    ollama_url: Option<String>,
    api_timeout_secs: Option<u64>,
    api_retry_attempts: Option<u32>,
    api_retry_delay_secs: Option<u64>,
    llm_max_attempts: Option<u32>,
    llm_initial_delay_secs: Option<u64>,
    cache_ttl_secs: Option<u64>,
    enable_caching: Option<bool>,
    show_api_urls: Option<bool>,
    rainfall_url: Option<String>,
    crop_production_url: Option<String>,
    water_usage_url: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub llm: Option<String>,
    pub no_cache: bool,
}

/// Parse a boolean flag from string
pub fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(SamarthError::ConfigInvalid {
            key: "bool".to_string(),
            reason: format!("Invalid boolean: {}. Use true or false", s),
        }),
    }
}

/// Show only the last four characters of a secret
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str, target: &mut ConfigValue<T>) {
    if let Ok(raw) = env::var(name) {
        match raw.trim().parse::<T>() {
            Ok(value) => target.update(value, ConfigSource::Environment),
            Err(_) => tracing::warn!("Invalid {} value '{}': expected a number", name, raw),
        }
    }
}
