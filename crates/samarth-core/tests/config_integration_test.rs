//! Integration tests for layered configuration
//!
//! Precedence: CLI arguments > Environment variables > Config file > Defaults

use samarth_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const ENV_VARS: &[&str] = &[
    "SAMARTH_DATA_API_KEY",
    "API_KEY",
    "SAMARTH_LLM_API_KEY",
    "GEMINI_KEY",
    "SAMARTH_LLM",
    "SAMARTH_API_TIMEOUT",
    "SAMARTH_CACHE_TTL",
    "SAMARTH_ENABLE_CACHING",
];

fn clear_env() {
    for name in ENV_VARS {
        env::remove_var(name);
    }
}

#[test]
fn test_file_overrides_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
llm = "ollama:llama3"
ollama_url = "http://gpu-box:11434"
api_retry_attempts = 5
show_api_urls = false
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap();

    assert_eq!(config.llm.value, "ollama:llama3");
    assert_eq!(config.llm.source, ConfigSource::File);
    assert_eq!(config.ollama_url.value, "http://gpu-box:11434");
    assert_eq!(config.api_retry_attempts.value, 5);
    assert!(!config.show_api_urls.value);
    // Untouched keys keep their defaults
    assert_eq!(config.api_timeout_secs.value, 30);
    assert_eq!(config.api_timeout_secs.source, ConfigSource::Default);
    assert_eq!(config.endpoints.source, ConfigSource::Default);
}

#[test]
fn test_missing_optional_file_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let config = LayeredConfig::with_defaults()
        .load_from_optional_file(dir.path().join("samarth.toml"))
        .unwrap();

    assert_eq!(config.llm.source, ConfigSource::Default);
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    env::set_var("SAMARTH_LLM", "ollama:env-model");
    env::set_var("SAMARTH_API_TIMEOUT", "12");

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
llm = "ollama:file-model"
api_timeout_secs = 45
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    assert_eq!(config.llm.value, "ollama:env-model");
    assert_eq!(config.llm.source, ConfigSource::Environment);
    assert_eq!(config.api_timeout_secs.value, 12);
    assert_eq!(config.api_timeout_secs.source, ConfigSource::Environment);

    clear_env();
}

#[test]
#[serial]
fn test_legacy_key_variables_are_fallbacks() {
    clear_env();
    env::set_var("API_KEY", "legacy-data-key");
    env::set_var("GEMINI_KEY", "legacy-llm-key");

    let config = LayeredConfig::with_defaults().load_from_env();
    assert_eq!(config.data_api_key.value, "legacy-data-key");
    assert_eq!(config.llm_api_key.value, "legacy-llm-key");

    env::set_var("SAMARTH_DATA_API_KEY", "primary-data-key");
    let config = LayeredConfig::with_defaults().load_from_env();
    assert_eq!(config.data_api_key.value, "primary-data-key");
    assert_eq!(config.data_api_key.source, ConfigSource::Environment);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_value_is_ignored() {
    clear_env();
    env::set_var("SAMARTH_CACHE_TTL", "forever");
    env::set_var("SAMARTH_ENABLE_CACHING", "maybe");

    let config = LayeredConfig::with_defaults().load_from_env();
    assert_eq!(config.cache_ttl_secs.value, 86_400);
    assert_eq!(config.cache_ttl_secs.source, ConfigSource::Default);
    assert!(config.enable_caching.value);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_all() {
    clear_env();
    env::set_var("SAMARTH_LLM", "ollama:env-model");
    env::set_var("SAMARTH_ENABLE_CACHING", "true");

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "llm = \"gemini:gemini-1.5-pro\"").unwrap();

    let mut config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    config.update_from_cli(CliConfigOverrides {
        llm: Some("gemini:gemini-2.0-flash".to_string()),
        no_cache: true,
    });

    assert_eq!(config.llm.value, "gemini:gemini-2.0-flash");
    assert_eq!(config.llm.source, ConfigSource::Cli);
    assert!(!config.enable_caching.value);
    assert_eq!(config.enable_caching.source, ConfigSource::Cli);

    assert!(ConfigSource::Cli.precedence() > ConfigSource::Environment.precedence());
    assert!(ConfigSource::Environment.precedence() > ConfigSource::File.precedence());
    assert!(ConfigSource::File.precedence() > ConfigSource::Default.precedence());

    clear_env();
}
