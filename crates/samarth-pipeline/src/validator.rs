//! Catalog checks on a parsed question. No network access.

use crate::parser::ParseOutcome;
use samarth_core::catalog::{
    normalize_state_name, validate_state, validate_year_for_crops, water_usage_crop, CROP_YEARS,
    WATER_USAGE_CROPS,
};
use samarth_core::models::{ParsedQuery, RejectionKind, ValidationResult};

const TOO_VAGUE_REASON: &str = "Your question is too vague. Please specify states, crops, or metrics.";
const TOO_VAGUE_SUGGESTION: &str = "Example: \"Compare rainfall in Punjab and Haryana for 2010-2014\"";
const UNAVAILABLE_SUGGESTION: &str = "Try: Punjab, Haryana (states); Wheat, Rice (crops); 2010-2014 (years)";

/// Validate a parse outcome against the metadata catalog.
///
/// Any single issue rejects the whole question; issues are joined with "; ".
pub fn validate_parsed_query(outcome: &ParseOutcome) -> ValidationResult {
    let parsed = match outcome {
        Ok(parsed) => parsed,
        Err(_) => return ValidationResult::invalid(RejectionKind::ParseError, "Failed to parse question"),
    };

    let entities = &parsed.entities;

    if entities.lacks_anchor() {
        return ValidationResult::invalid(RejectionKind::TooVague, TOO_VAGUE_REASON)
            .with_suggestion(TOO_VAGUE_SUGGESTION);
    }

    let mut issues: Vec<String> = Vec::new();

    for state in &entities.states {
        if !validate_state(state) {
            issues.push(format!("State '{}' not available", state));
        }
    }

    let wants_crop_data = entities.has_metric("production") || !entities.crops.is_empty();
    if wants_crop_data && entities.years.iter().any(|y| !validate_year_for_crops(*y)) {
        issues.push(format!(
            "Crop data only available for {}-{}",
            CROP_YEARS.min, CROP_YEARS.max
        ));
    }

    if entities.mentions_water()
        && !entities.crops.is_empty()
        && !entities.crops.iter().any(|c| water_usage_crop(c).is_some())
    {
        issues.push(format!(
            "Water usage data only for: {}",
            WATER_USAGE_CROPS.join(", ")
        ));
    }

    if issues.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::invalid(RejectionKind::DataUnavailable, issues.join("; "))
            .with_suggestion(UNAVAILABLE_SUGGESTION)
    }
}

/// Copy of a validated query with canonical state names and sorted, deduplicated years
pub fn normalize_query(parsed: &ParsedQuery) -> ParsedQuery {
    let mut normalized = parsed.clone();

    let mut states: Vec<String> = Vec::new();
    for state in &parsed.entities.states {
        let canonical = normalize_state_name(state);
        if !states.contains(&canonical) {
            states.push(canonical);
        }
    }
    normalized.entities.states = states;

    normalized.entities.years.sort_unstable();
    normalized.entities.years.dedup();

    normalized
}
