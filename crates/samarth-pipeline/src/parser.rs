//! LLM-backed extraction of intent and entities from a question

use samarth_core::catalog::prompt_summary;
use samarth_core::models::ParsedQuery;
use samarth_llm::{extract_json_block, LlmError, LlmErrorKind, TextGenerator};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a question could not be turned into a [`ParsedQuery`]
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{message}")]
pub struct ParseFailure {
    /// Human-readable error
    pub message: String,

    /// Model output that failed to decode, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,

    /// Category of the LLM failure when the call itself failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_error: Option<LlmErrorKind>,
}

impl ParseFailure {
    fn invalid_json(raw: &str, error: serde_json::Error) -> Self {
        Self {
            message: format!("Could not parse the model response as JSON: {}", error),
            raw_response: Some(raw.to_string()),
            llm_error: None,
        }
    }

    fn llm(error: &LlmError) -> Self {
        Self {
            message: error.to_string(),
            raw_response: None,
            llm_error: Some(error.kind()),
        }
    }
}

pub type ParseOutcome = Result<ParsedQuery, ParseFailure>;

/// Prompt asking the model for a single ParsedQuery JSON object
pub fn build_parse_prompt(question: &str) -> String {
    format!(
        r#"You are a query parser for an agricultural data system.

AVAILABLE DATA:
{catalog}

USER QUESTION: "{question}"

TASK: Extract structured information from this question.

Return ONLY valid JSON in this EXACT format (no markdown, no extra text):
{{
  "intent": "comparison | trend | extreme | policy | general",
  "entities": {{
    "states": ["State1", "State2"],
    "crops": ["Crop1"],
    "years": [2010, 2011, 2012],
    "metrics": ["rainfall", "production"]
  }},
  "question_type": "brief description of what user wants",
  "time_period": "description of time range"
}}

RULES:
- Only include states/crops that are clearly mentioned
- For "last 5 years", use [2010, 2011, 2012, 2013, 2014]
- For a range like "2010-2014", list every year in it
- For single year like "2014", use [2014]
- Use "water" as the metric for irrigation or water usage questions
- If comparing states, intent is "comparison"
- If asking about trends over time, intent is "trend"
- If asking for highest/lowest/best/worst, intent is "extreme"
- If asking for recommendations/reasons, intent is "policy"
"#,
        catalog = prompt_summary(),
        question = question.replace('"', "'"),
    )
}

/// Decode model output into a ParsedQuery, tolerating a markdown fence
pub fn parse_llm_response(response: &str) -> ParseOutcome {
    let json = extract_json_block(response);
    serde_json::from_str::<ParsedQuery>(json).map_err(|e| ParseFailure::invalid_json(response, e))
}

/// Query parser bound to a text generator
pub struct QueryParser<'a, G: ?Sized> {
    generator: &'a G,
}

impl<'a, G: TextGenerator + ?Sized> QueryParser<'a, G> {
    pub fn new(generator: &'a G) -> Self {
        Self { generator }
    }

    /// Parse one question. Never fails across the boundary: errors become `Err(ParseFailure)`.
    pub async fn parse(&self, question: &str) -> ParseOutcome {
        info!(question = %question, "Parsing question");
        let prompt = build_parse_prompt(question);

        let response = match self.generator.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(kind = %e.kind(), error = %e, "Parser LLM call failed");
                return Err(ParseFailure::llm(&e));
            }
        };

        match parse_llm_response(&response) {
            Ok(parsed) => {
                info!(
                    intent = %parsed.intent,
                    states = ?parsed.entities.states,
                    crops = ?parsed.entities.crops,
                    years = ?parsed.entities.years,
                    "Parsed question"
                );
                Ok(parsed)
            }
            Err(failure) => {
                let preview: String = response.chars().take(200).collect();
                debug!(response = %preview, "Unparseable parser response");
                warn!(error = %failure.message, "Failed to parse model response");
                Err(failure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use samarth_core::models::Intent;

    #[test]
    fn test_prompt_embeds_question_and_catalog() {
        let prompt = build_parse_prompt("Compare \"rainfall\" in Punjab");
        assert!(prompt.contains("USER QUESTION: \"Compare 'rainfall' in Punjab\""));
        assert!(prompt.contains("1997-2014"));
        assert!(prompt.contains("\"intent\": \"comparison | trend | extreme | policy | general\""));
    }

    #[test]
    fn test_parse_fenced_response() {
        let response = "```json\n{\"intent\": \"comparison\", \"entities\": {\"states\": [\"Punjab\", \"Haryana\"], \"crops\": [], \"years\": [2010], \"metrics\": [\"rainfall\"]}, \"question_type\": \"compare\", \"time_period\": \"2010\"}\n```";
        let parsed = parse_llm_response(response).unwrap();
        assert_eq!(parsed.intent, Intent::Comparison);
        assert_eq!(parsed.entities.states, vec!["Punjab", "Haryana"]);
        assert_eq!(parsed.entities.years, vec![2010]);
    }

    #[test]
    fn test_parse_tolerates_nulls_and_string_years() {
        let response = r#"{"intent": "trend", "entities": {"states": ["Punjab"], "crops": null, "years": ["2010", 2011.0], "metrics": []}, "question_type": null}"#;
        let parsed = parse_llm_response(response).unwrap();
        assert!(parsed.entities.crops.is_empty());
        assert_eq!(parsed.entities.years, vec![2010, 2011]);
        assert_eq!(parsed.time_period, "");
    }

    #[test]
    fn test_parse_failure_is_structured() {
        let failure = parse_llm_response("I cannot help with that.").unwrap_err();
        assert!(failure.message.contains("JSON"));
        assert_eq!(failure.raw_response.as_deref(), Some("I cannot help with that."));
        assert!(failure.llm_error.is_none());
    }

    #[test]
    fn test_unknown_intent_is_rejected() {
        assert!(parse_llm_response(r#"{"intent": "forecast", "entities": {}}"#).is_err());
    }
}
