use samarth_core::catalog::water_usage_crop;
use samarth_core::models::{
    ApiKind, ApiSpec, Citation, FetchBundle, FetchResult, FetchedData, RejectionKind,
    ValidationResult,
};
use samarth_data::DataFetcher;
use samarth_llm::TextGenerator;
use tracing::{info, warn};

use crate::answer::{build_answer_prompt, build_data_digest, build_general_prompt};
use crate::classifier::{classify_chat, ChatKind, GREETING_REPLY, HELP_REPLY};
use crate::models::{KeyedFailure, PreparedTurn, TurnKind, TurnOutcome};
use crate::parser::QueryParser;
use crate::planner::{determine_required_apis, DEFAULT_WATER_CROP};
use crate::validator::{normalize_query, validate_parsed_query};

/// Rainfall years used when the question names none
pub const DEFAULT_RAINFALL_YEARS: [i32; 5] = [2010, 2011, 2012, 2013, 2014];

/// Crop year used when the question names none
pub const DEFAULT_CROP_YEAR: i32 = 2014;

const PARSE_ERROR_MESSAGE: &str = "I couldn't understand your question.\n\n\
Include:\n\
- State names (Punjab, Haryana, etc.)\n\
- Crop types (wheat, rice, etc.)\n\
- Time periods (2010-2014, etc.)";

const NO_DATA_MESSAGE: &str = "No data found.\n\n\
Try:\n\
- States: Punjab, Haryana, Maharashtra\n\
- Years: 2010-2014\n\
- Crops: wheat, rice, cotton";

/// Question answering pipeline for one user turn at a time.
///
/// The pipeline holds no per-turn state; the fetcher's cache is the only
/// thing shared between turns.
pub struct QaPipeline<G: TextGenerator> {
    generator: G,
    fetcher: DataFetcher,
}

impl<G: TextGenerator> QaPipeline<G> {
    /// Create a new pipeline
    pub fn new(generator: G, fetcher: DataFetcher) -> Self {
        Self { generator, fetcher }
    }

    pub fn fetcher(&self) -> &DataFetcher {
        &self.fetcher
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Classify, parse, validate and plan without fetching anything
    pub async fn prepare(&self, question: &str) -> PreparedTurn {
        let chat_kind = classify_chat(question);
        let mut prepared = PreparedTurn::routed(question, chat_kind);

        if chat_kind != ChatKind::Agriculture {
            return prepared;
        }

        let outcome = QueryParser::new(&self.generator).parse(question).await;
        let validation = validate_parsed_query(&outcome);

        match outcome {
            Ok(parsed) => {
                if validation.is_valid() {
                    let normalized = normalize_query(&parsed);
                    prepared.plan = determine_required_apis(&normalized);
                    prepared.parsed = Some(normalized);
                } else {
                    prepared.parsed = Some(parsed);
                }
            }
            Err(failure) => prepared.parse_error = Some(failure),
        }

        prepared.validation = Some(validation);
        prepared
    }

    /// Run one full turn. Always produces exactly one message.
    pub async fn answer(&self, question: &str) -> TurnOutcome {
        let prepared = self.prepare(question).await;

        match prepared.chat_kind {
            ChatKind::Greeting => {
                return TurnOutcome::new(prepared, TurnKind::Greeting, GREETING_REPLY)
            }
            ChatKind::Help => return TurnOutcome::new(prepared, TurnKind::Help, HELP_REPLY),
            ChatKind::General => return self.general_chat(prepared).await,
            ChatKind::Agriculture => {}
        }

        if let Some(ValidationResult::Invalid {
            kind,
            reason,
            suggestion,
        }) = prepared.validation.clone()
        {
            let message = rejection_message(kind, &reason, suggestion.as_deref());
            info!(kind = kind.as_str(), reason = %reason, "Question rejected");
            return TurnOutcome::new(prepared, TurnKind::Rejected, message);
        }

        let (bundle, citations) = self.execute_plan(&prepared.plan).await;
        let failures: Vec<KeyedFailure> = bundle
            .failures()
            .map(|(key, failure)| KeyedFailure {
                key: key.to_string(),
                failure: failure.clone(),
            })
            .collect();

        if bundle.success_count() == 0 && !failures.is_empty() {
            let message = service_unavailable_message(&failures);
            warn!(failed = failures.len(), "Every fetch failed");
            return TurnOutcome::new(prepared, TurnKind::ServiceUnavailable, message)
                .with_failures(failures);
        }

        if bundle.total_records() == 0 {
            info!(calls = bundle.len(), "No matching records");
            return TurnOutcome::new(prepared, TurnKind::NoData, NO_DATA_MESSAGE)
                .with_citations(citations)
                .with_failures(failures);
        }

        let digest = build_data_digest(question, &bundle);
        let prompt = build_answer_prompt(question, &digest);

        match self.generator.complete(&prompt).await {
            Ok(answer) => {
                info!(records = bundle.total_records(), "Answer generated");
                TurnOutcome::new(prepared, TurnKind::Answered, answer.trim())
                    .with_citations(citations)
                    .with_failures(failures)
            }
            Err(e) => {
                warn!(kind = %e.kind(), error = %e, "Answer generation failed");
                TurnOutcome::new(
                    prepared,
                    TurnKind::Failed,
                    format!("Answer generation failed: {}", e),
                )
                .with_citations(citations)
                .with_failures(failures)
            }
        }
    }

    async fn general_chat(&self, prepared: PreparedTurn) -> TurnOutcome {
        let prompt = build_general_prompt(&prepared.question);
        match self.generator.complete(&prompt).await {
            Ok(reply) => TurnOutcome::new(prepared, TurnKind::General, reply.trim()),
            Err(e) => {
                warn!(kind = %e.kind(), error = %e, "General chat failed");
                TurnOutcome::new(
                    prepared,
                    TurnKind::Failed,
                    format!("Answer generation failed: {}", e),
                )
            }
        }
    }

    /// Run every planned fetch in order, one at a time
    pub async fn execute_plan(&self, plan: &[ApiSpec]) -> (FetchBundle, Vec<Citation>) {
        let mut bundle = FetchBundle::new();
        let mut citations = Vec::new();

        for spec in plan {
            match spec.api {
                ApiKind::Rainfall => {
                    let years: Vec<i32> = if spec.years.is_empty() {
                        DEFAULT_RAINFALL_YEARS.to_vec()
                    } else {
                        spec.years.clone()
                    };
                    let (first, last) = year_bounds(&years);

                    for state in &spec.states {
                        let result = self.fetcher.fetch_rainfall_annual(state, &years).await;
                        record(
                            &mut bundle,
                            &mut citations,
                            format!("rainfall_{}", state),
                            format!("Rainfall data for {} ({}-{})", state, first, last),
                            result,
                        );
                    }
                }
                ApiKind::Crops => {
                    let year = spec.years.iter().copied().max().unwrap_or(DEFAULT_CROP_YEAR);
                    let crop = spec.crops.first().map(String::as_str);

                    for state in &spec.states {
                        let result = self.fetcher.fetch_crop_production(state, crop, Some(year)).await;
                        record(
                            &mut bundle,
                            &mut citations,
                            format!("crops_{}", state),
                            format!("Crop production for {} in {}", state, year),
                            result,
                        );
                    }
                }
                ApiKind::Water => {
                    let requested: Vec<&str> = if spec.crops.is_empty() {
                        vec![DEFAULT_WATER_CROP]
                    } else {
                        spec.crops.iter().map(String::as_str).collect()
                    };

                    let mut crops: Vec<&'static str> = Vec::new();
                    for crop in requested.into_iter().filter_map(water_usage_crop) {
                        if !crops.contains(&crop) {
                            crops.push(crop);
                        }
                    }

                    for crop in crops {
                        let result = self.fetcher.fetch_water_usage(Some(crop)).await;
                        record(
                            &mut bundle,
                            &mut citations,
                            format!("water_{}", crop),
                            format!("Water efficiency data for {}", crop),
                            result,
                        );
                    }
                }
            }
        }

        (bundle, citations)
    }
}

fn record(
    bundle: &mut FetchBundle,
    citations: &mut Vec<Citation>,
    key: String,
    purpose: String,
    result: FetchResult,
) {
    if let Ok(data) = &result {
        citations.push(citation(purpose, data));
    }
    bundle.insert(key, result);
}

fn citation(purpose: String, data: &FetchedData) -> Citation {
    Citation {
        purpose,
        url: data.api_url.clone(),
        records: data.total_matched(),
        dataset: data.kind().dataset_label().to_string(),
    }
}

fn year_bounds(years: &[i32]) -> (i32, i32) {
    let first = years.iter().copied().min().unwrap_or(DEFAULT_RAINFALL_YEARS[0]);
    let last = years.iter().copied().max().unwrap_or(DEFAULT_RAINFALL_YEARS[4]);
    (first, last)
}

fn rejection_message(kind: RejectionKind, reason: &str, suggestion: Option<&str>) -> String {
    match kind {
        RejectionKind::ParseError => PARSE_ERROR_MESSAGE.to_string(),
        RejectionKind::TooVague => format!(
            "{}\n\nBe specific:\n- States: Punjab, Maharashtra, etc.\n- Crops: wheat, rice, cotton, etc.\n- Years: 2010-2014, etc.",
            reason
        ),
        RejectionKind::DataUnavailable => match suggestion {
            Some(suggestion) => format!("{}\n\n{}", reason, suggestion),
            None => reason.to_string(),
        },
    }
}

fn service_unavailable_message(failures: &[KeyedFailure]) -> String {
    let detail = failures
        .first()
        .map(|f| f.failure.message.as_str())
        .unwrap_or("The data portal could not be reached.");
    format!(
        "{}\n\n{} data request(s) failed. This is usually temporary, so please try again in a moment.",
        detail,
        failures.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use samarth_core::models::FetchFailure;

    #[test]
    fn test_rejection_messages() {
        let message = rejection_message(RejectionKind::DataUnavailable, "State 'X' not available", Some("Try: Punjab"));
        assert_eq!(message, "State 'X' not available\n\nTry: Punjab");
        assert!(rejection_message(RejectionKind::ParseError, "", None).starts_with("I couldn't understand"));
        assert!(rejection_message(RejectionKind::TooVague, "Too vague.", None).contains("Be specific"));
    }

    #[test]
    fn test_service_unavailable_message() {
        let failures = vec![KeyedFailure {
            key: "rainfall_Punjab".to_string(),
            failure: FetchFailure::timeout("timed out"),
        }];
        let message = service_unavailable_message(&failures);
        assert!(message.contains("did not respond in time"));
        assert!(message.contains("1 data request(s) failed"));
    }

    #[test]
    fn test_year_bounds() {
        assert_eq!(year_bounds(&[2012, 2010, 2014]), (2010, 2014));
        assert_eq!(year_bounds(&[]), (2010, 2014));
    }
}
