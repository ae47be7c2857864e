use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse category of a question, used to decide which datasets to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Comparison,
    Trend,
    Extreme,
    Policy,
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Comparison => "comparison",
            Intent::Trend => "trend",
            Intent::Extreme => "extreme",
            Intent::Policy => "policy",
            Intent::General => "general",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured values extracted from the question text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub states: Vec<String>,

    #[serde(default, deserialize_with = "nullable_vec")]
    pub crops: Vec<String>,

    #[serde(default, deserialize_with = "year_list")]
    pub years: Vec<i32>,

    #[serde(default, deserialize_with = "nullable_vec")]
    pub metrics: Vec<String>,
}

impl Entities {
    /// Check for an exact (case-insensitive) metric name
    pub fn has_metric(&self, metric: &str) -> bool {
        self.metrics.iter().any(|m| m.trim().eq_ignore_ascii_case(metric))
    }

    /// Any metric mentioning water ("water", "water usage", "water_efficiency", ...)
    pub fn mentions_water(&self) -> bool {
        self.metrics.iter().any(|m| m.to_lowercase().contains("water"))
    }

    /// True when nothing the pipeline can act on was extracted
    pub fn lacks_anchor(&self) -> bool {
        self.states.is_empty() && self.crops.is_empty() && self.metrics.is_empty()
    }
}

/// Parsed form of one user question. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub intent: Intent,

    #[serde(default)]
    pub entities: Entities,

    #[serde(default, deserialize_with = "nullable_string")]
    pub question_type: String,

    #[serde(default, deserialize_with = "nullable_string")]
    pub time_period: String,
}

impl ParsedQuery {
    pub fn new(intent: Intent, entities: Entities) -> Self {
        Self {
            intent,
            entities,
            question_type: String::new(),
            time_period: String::new(),
        }
    }
}

/// Why a question was rejected before any data was fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    ParseError,
    TooVague,
    DataUnavailable,
}

impl RejectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionKind::ParseError => "parse_error",
            RejectionKind::TooVague => "too_vague",
            RejectionKind::DataUnavailable => "data_unavailable",
        }
    }
}

/// Outcome of checking a parsed question against the metadata catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationResult {
    Valid,
    Invalid {
        kind: RejectionKind,
        reason: String,
        suggestion: Option<String>,
    },
}

impl ValidationResult {
    pub fn invalid(kind: RejectionKind, reason: impl Into<String>) -> Self {
        ValidationResult::Invalid {
            kind,
            reason: reason.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(self, suggestion: impl Into<String>) -> Self {
        match self {
            ValidationResult::Invalid { kind, reason, .. } => ValidationResult::Invalid {
                kind,
                reason,
                suggestion: Some(suggestion.into()),
            },
            valid => valid,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn kind(&self) -> Option<RejectionKind> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid { kind, .. } => Some(*kind),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid { reason, .. } => Some(reason),
        }
    }
}

/// Dataset endpoint a plan item targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKind {
    Rainfall,
    Crops,
    Water,
}

impl ApiKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKind::Rainfall => "rainfall",
            ApiKind::Crops => "crops",
            ApiKind::Water => "water",
        }
    }

    /// Dataset label shown in citations
    pub fn dataset_label(&self) -> &'static str {
        match self {
            ApiKind::Rainfall => "IMD Rainfall Data",
            ApiKind::Crops => "Ministry of Agriculture - Crop Production",
            ApiKind::Water => "ICAR Water Efficiency Comparison",
        }
    }
}

impl fmt::Display for ApiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One planned dataset request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSpec {
    pub api: ApiKind,

    #[serde(default)]
    pub states: Vec<String>,

    #[serde(default)]
    pub crops: Vec<String>,

    #[serde(default)]
    pub years: Vec<i32>,
}

impl ApiSpec {
    pub fn new(api: ApiKind) -> Self {
        Self {
            api,
            states: Vec::new(),
            crops: Vec::new(),
            years: Vec::new(),
        }
    }

    pub fn with_states(mut self, states: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.states = states.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_crops(mut self, crops: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.crops = crops.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_years(mut self, years: impl IntoIterator<Item = i32>) -> Self {
        self.years = years.into_iter().collect();
        self
    }
}

fn nullable_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Years arrive as integers, floats or numeric strings depending on the model
fn year_list<'de, D>(deserializer: D) -> Result<Vec<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();

    values
        .into_iter()
        .map(|value| match &value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .and_then(|y| i32::try_from(y).ok())
                .ok_or_else(|| de::Error::custom(format!("invalid year: {}", value))),
            serde_json::Value::String(s) => s
                .trim()
                .parse::<i32>()
                .map_err(|_| de::Error::custom(format!("invalid year: {:?}", s))),
            other => Err(de::Error::custom(format!("invalid year: {}", other))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_query_from_json() {
        let json = r#"{
            "intent": "comparison",
            "entities": {
                "states": ["Punjab", "Haryana"],
                "crops": [],
                "years": [2010, "2011", 2012.0],
                "metrics": ["rainfall"]
            },
            "question_type": "compare rainfall",
            "time_period": "2010-2012"
        }"#;

        let parsed: ParsedQuery = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.intent, Intent::Comparison);
        assert_eq!(parsed.entities.states, vec!["Punjab", "Haryana"]);
        assert_eq!(parsed.entities.years, vec![2010, 2011, 2012]);
        assert!(parsed.entities.has_metric("Rainfall"));
    }

    #[test]
    fn test_missing_and_null_fields_default() {
        let json = r#"{"intent": "general", "entities": {"states": null}, "time_period": null}"#;
        let parsed: ParsedQuery = serde_json::from_str(json).unwrap();
        assert!(parsed.entities.lacks_anchor());
        assert!(parsed.time_period.is_empty());
    }

    #[test]
    fn test_unknown_intent_is_rejected() {
        let json = r#"{"intent": "comparison | trend", "entities": {}}"#;
        assert!(serde_json::from_str::<ParsedQuery>(json).is_err());
    }

    #[test]
    fn test_bad_year_is_rejected() {
        let json = r#"{"intent": "trend", "entities": {"years": ["last year"]}}"#;
        assert!(serde_json::from_str::<ParsedQuery>(json).is_err());
    }

    #[test]
    fn test_water_metric_detection() {
        let entities = Entities {
            metrics: vec!["Water Usage".to_string()],
            ..Entities::default()
        };
        assert!(entities.mentions_water());
        assert!(!entities.has_metric("water"));
    }

    #[test]
    fn test_validation_result_serialization() {
        let result = ValidationResult::invalid(RejectionKind::TooVague, "too vague")
            .with_suggestion("be specific");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "invalid");
        assert_eq!(json["kind"], "too_vague");
        assert_eq!(json["suggestion"], "be specific");
        assert_eq!(result.kind(), Some(RejectionKind::TooVague));
    }
}
