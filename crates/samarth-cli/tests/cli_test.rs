//! Integration tests for the samarth binary
//!
//! These run offline: only commands that never reach the network are exercised.

use std::process::{Command, Output};

/// Run the binary in an empty directory with a clean environment
fn samarth(args: &[&str], env: &[(&str, &str)]) -> Output {
    let dir = tempfile::tempdir().unwrap();
    let mut command = Command::new(env!("CARGO_BIN_EXE_samarth"));
    command.args(args).current_dir(dir.path()).env_clear();
    for (key, value) in env {
        command.env(key, value);
    }
    command.output().expect("Failed to execute command")
}

fn json_stdout(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

#[test]
fn test_catalog_states_json() {
    let output = samarth(&["catalog", "states", "--json"], &[]);
    assert!(output.status.success());

    let parsed = json_stdout(&output);
    assert_eq!(parsed["status"], "success");
    let rows = parsed["data"].as_array().unwrap();
    assert!(rows
        .iter()
        .any(|row| row["state"] == "Punjab" && row["subdivision"] == "PUNJAB"));
}

#[test]
fn test_config_masks_keys_and_reports_sources() {
    let output = samarth(
        &["config", "--json"],
        &[("SAMARTH_DATA_API_KEY", "secret12345678")],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("secret12345678"));

    let parsed = json_stdout(&output);
    let rows = parsed["data"].as_array().unwrap();
    let key = rows.iter().find(|row| row["key"] == "data_api_key").unwrap();
    assert_eq!(key["value"], "****5678");
    assert_eq!(key["source"], "environment");
}

#[test]
fn test_greeting_needs_no_network() {
    let output = samarth(
        &["ask", "hello", "--json", "--llm", "ollama:llama3"],
        &[("SAMARTH_DATA_API_KEY", "test-key")],
    );
    assert!(output.status.success());

    let parsed = json_stdout(&output);
    assert_eq!(parsed["data"]["kind"], "greeting");
    assert_eq!(parsed["data"]["citations"].as_array().unwrap().len(), 0);
}

#[test]
fn test_dry_run_with_json_output() {
    let output = samarth(
        &["ask", "hi", "--dry-run", "--json", "--llm", "ollama:llama3"],
        &[("SAMARTH_DATA_API_KEY", "test-key")],
    );
    assert!(output.status.success());

    let data = json_stdout(&output)["data"].clone();
    assert_eq!(data["dry_run"], true);
    assert_eq!(data["route"], "greeting");
    assert_eq!(data["planned_calls"].as_array().unwrap().len(), 0);
}

#[test]
fn test_missing_data_key_fails_with_suggestions() {
    let output = samarth(&["ask", "rainfall in Punjab", "--llm", "ollama:llama3"], &[]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Missing configuration: data_api_key"));
    assert!(stderr.contains("SAMARTH_DATA_API_KEY"));
}

#[test]
fn test_unknown_provider_is_reported() {
    let output = samarth(
        &["ask", "hello", "--llm", "openai:gpt-4"],
        &[("SAMARTH_DATA_API_KEY", "test-key")],
    );
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown LLM provider: openai"));
}

#[test]
fn test_doctor_json_without_keys() {
    let output = samarth(&["doctor", "--json"], &[]);
    assert!(output.status.success());

    let data = json_stdout(&output)["data"].clone();
    assert!(data["passed"].as_u64().unwrap() < data["total"].as_u64().unwrap());
    let checks = data["checks"].as_array().unwrap();
    assert!(checks
        .iter()
        .any(|c| c["name"] == "Data portal key" && c["status"] == "fail"));
}
