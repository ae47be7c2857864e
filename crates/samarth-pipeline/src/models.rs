use chrono::{DateTime, Utc};
use samarth_core::models::{ApiSpec, Citation, FetchFailure, ParsedQuery, ValidationResult};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::classifier::ChatKind;
use crate::parser::ParseFailure;

/// Terminal state of one user turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    /// Canned greeting
    Greeting,
    /// Canned capability overview
    Help,
    /// Non-agricultural question answered by the general-chat prompt
    General,
    /// Parse or validation rejection
    Rejected,
    /// Nothing matched the question
    NoData,
    /// Every fetch failed on transient portal errors
    ServiceUnavailable,
    /// Answer generated from fetched data
    Answered,
    /// LLM failure while composing the answer
    Failed,
}

impl TurnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnKind::Greeting => "greeting",
            TurnKind::Help => "help",
            TurnKind::General => "general",
            TurnKind::Rejected => "rejected",
            TurnKind::NoData => "no_data",
            TurnKind::ServiceUnavailable => "service_unavailable",
            TurnKind::Answered => "answered",
            TurnKind::Failed => "failed",
        }
    }

    /// Whether the message reports a problem rather than an answer
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            TurnKind::Rejected | TurnKind::NoData | TurnKind::ServiceUnavailable | TurnKind::Failed
        )
    }
}

impl fmt::Display for TurnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed fetch under its synthetic key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyedFailure {
    pub key: String,
    #[serde(flatten)]
    pub failure: FetchFailure,
}

/// Everything decided about a question before any data is fetched
#[derive(Debug, Clone, Serialize)]
pub struct PreparedTurn {
    pub question: String,
    pub chat_kind: ChatKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<ParsedQuery>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<ParseFailure>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,

    /// Planned dataset requests, empty unless the question validated
    pub plan: Vec<ApiSpec>,
}

impl PreparedTurn {
    pub(crate) fn routed(question: &str, chat_kind: ChatKind) -> Self {
        Self {
            question: question.to_string(),
            chat_kind,
            parsed: None,
            parse_error: None,
            validation: None,
            plan: Vec::new(),
        }
    }

    /// True when the question passed validation
    pub fn is_valid(&self) -> bool {
        self.validation.as_ref().is_some_and(ValidationResult::is_valid)
    }
}

/// Result of one user turn: exactly one message, plus traceability
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub turn_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub question: String,
    pub kind: TurnKind,

    /// The single message shown to the user
    pub message: String,

    /// Sources of the data behind the answer, in fetch order
    pub citations: Vec<Citation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<ParsedQuery>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,

    pub plan: Vec<ApiSpec>,

    pub failures: Vec<KeyedFailure>,
}

impl TurnOutcome {
    pub(crate) fn new(prepared: PreparedTurn, kind: TurnKind, message: impl Into<String>) -> Self {
        Self {
            turn_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            question: prepared.question,
            kind,
            message: message.into(),
            citations: Vec::new(),
            parsed: prepared.parsed,
            validation: prepared.validation,
            plan: prepared.plan,
            failures: Vec::new(),
        }
    }

    pub(crate) fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.citations = citations;
        self
    }

    pub(crate) fn with_failures(mut self, failures: Vec<KeyedFailure>) -> Self {
        self.failures = failures;
        self
    }

    /// Records behind the answer
    pub fn total_records(&self) -> usize {
        self.citations.iter().map(|c| c.records).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_kind_strings() {
        assert_eq!(TurnKind::ServiceUnavailable.as_str(), "service_unavailable");
        assert_eq!(
            serde_json::to_value(TurnKind::NoData).unwrap(),
            serde_json::json!("no_data")
        );
        assert!(TurnKind::Failed.is_error());
        assert!(!TurnKind::Answered.is_error());
    }

    #[test]
    fn test_outcome_totals() {
        let prepared = PreparedTurn::routed("hi", ChatKind::Greeting);
        let outcome = TurnOutcome::new(prepared, TurnKind::Answered, "ok").with_citations(vec![
            Citation {
                purpose: "a".to_string(),
                url: "u".to_string(),
                records: 2,
                dataset: "d".to_string(),
            },
            Citation {
                purpose: "b".to_string(),
                url: "u".to_string(),
                records: 3,
                dataset: "d".to_string(),
            },
        ]);
        assert_eq!(outcome.total_records(), 5);
        assert_eq!(outcome.question, "hi");
    }
}
