use chrono::{DateTime, Utc};
use samarth_core::models::{ApiSpec, ParsedQuery, ValidationResult};
use samarth_pipeline::{ChatKind, KeyedFailure, ParseFailure, TurnKind};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

/// Output for ask and for each chat turn
#[derive(Debug, Serialize)]
pub struct TurnOutput {
    pub turn_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub question: String,
    pub kind: TurnKind,
    pub message: String,
    pub total_records: usize,
    pub citations: Vec<CitationItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<ExplainOutput>,
}

#[derive(Debug, Serialize)]
pub struct CitationItem {
    pub dataset: String,
    pub purpose: String,
    pub records: usize,
    /// Request URL with the API key redacted, when URLs are shown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Citation row for the traceability table
#[derive(Debug, Tabled, Serialize)]
pub struct CitationRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Dataset")]
    pub dataset: String,
    #[tabled(rename = "Purpose")]
    pub purpose: String,
    #[tabled(rename = "Records")]
    pub records: usize,
}

/// How the question was understood, for --explain
#[derive(Debug, Serialize)]
pub struct ExplainOutput {
    pub parsed: Option<ParsedQuery>,
    pub validation: Option<ValidationResult>,
    pub plan: Vec<ApiSpec>,
    pub failures: Vec<KeyedFailure>,
}

/// Output for --dry-run
#[derive(Debug, Serialize)]
pub struct DryRunOutput {
    pub dry_run: bool,
    pub question: String,
    pub route: ChatKind,
    pub parsed: Option<ParsedQuery>,
    pub parse_error: Option<ParseFailure>,
    pub validation: Option<ValidationResult>,
    pub planned_calls: Vec<ApiSpec>,
}

/// Output for catalog states
#[derive(Debug, Tabled, Serialize)]
pub struct StateRow {
    #[tabled(rename = "State")]
    pub state: String,
    #[tabled(rename = "Rainfall subdivision")]
    pub subdivision: String,
    #[tabled(rename = "All subdivisions")]
    pub all_subdivisions: String,
}

/// Output for catalog crops
#[derive(Debug, Tabled, Serialize)]
pub struct CropRow {
    #[tabled(rename = "Crop")]
    pub crop: String,
    #[tabled(rename = "Water usage data")]
    pub water_usage: bool,
}

/// Output for catalog subdivisions
#[derive(Debug, Tabled, Serialize)]
pub struct SubdivisionRow {
    #[tabled(rename = "Subdivision")]
    pub subdivision: String,
    #[tabled(rename = "States")]
    pub states: String,
}

/// Output for catalog coverage
#[derive(Debug, Tabled, Serialize)]
pub struct CoverageRow {
    #[tabled(rename = "Dataset")]
    pub dataset: String,
    #[tabled(rename = "Source")]
    pub source: String,
    #[tabled(rename = "Years")]
    pub years: String,
    #[tabled(rename = "Granularity")]
    pub granularity: String,
}

/// Output for config command
#[derive(Debug, Tabled, Serialize)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// One doctor check
#[derive(Debug, Serialize)]
pub struct DoctorCheck {
    pub group: &'static str,
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Output for doctor command
#[derive(Debug, Serialize)]
pub struct DoctorOutput {
    pub checks: Vec<DoctorCheck>,
    pub passed: usize,
    pub total: usize,
}
