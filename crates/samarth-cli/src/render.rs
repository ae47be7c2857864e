//! Rendering of pipeline turns for the terminal and for JSON

use crate::output::OutputWriter;
use crate::output_types::{CitationItem, CitationRow, DryRunOutput, ExplainOutput, TurnOutput};
use anyhow::Result;
use console::style;
use samarth_core::models::{ApiSpec, ParsedQuery, ValidationResult};
use samarth_data::redact_api_key;
use samarth_pipeline::{ChatKind, PreparedTurn, TurnKind, TurnOutcome};

/// Display options shared by ask and chat
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub show_api_urls: bool,
    pub explain: bool,
}

pub fn turn_output(outcome: &TurnOutcome, options: RenderOptions) -> TurnOutput {
    let citations = outcome
        .citations
        .iter()
        .map(|c| CitationItem {
            dataset: c.dataset.clone(),
            purpose: c.purpose.clone(),
            records: c.records,
            url: options.show_api_urls.then(|| redact_api_key(&c.url)),
        })
        .collect();

    let explanation = options.explain.then(|| ExplainOutput {
        parsed: outcome.parsed.clone(),
        validation: outcome.validation.clone(),
        plan: outcome.plan.clone(),
        failures: outcome.failures.clone(),
    });

    TurnOutput {
        turn_id: outcome.turn_id,
        timestamp: outcome.timestamp,
        question: outcome.question.clone(),
        kind: outcome.kind,
        message: outcome.message.clone(),
        total_records: outcome.total_records(),
        citations,
        explanation,
    }
}

/// Print one turn: the message, then sources, then the explanation if asked
pub fn render_turn(output: &OutputWriter, outcome: &TurnOutcome, options: RenderOptions) -> Result<()> {
    if output.is_json() {
        return output.result(turn_output(outcome, options));
    }

    match outcome.kind {
        TurnKind::Rejected | TurnKind::NoData => output.warning(&outcome.message),
        TurnKind::ServiceUnavailable | TurnKind::Failed => output.error(&outcome.message),
        _ => output.text(&outcome.message),
    }

    if !outcome.citations.is_empty() {
        output.section("Data Sources & Traceability");

        let rows: Vec<CitationRow> = outcome
            .citations
            .iter()
            .enumerate()
            .map(|(i, c)| CitationRow {
                index: i + 1,
                dataset: c.dataset.clone(),
                purpose: c.purpose.clone(),
                records: c.records,
            })
            .collect();
        output.table(rows)?;

        if options.show_api_urls {
            for (i, citation) in outcome.citations.iter().enumerate() {
                println!("  [{}] {}", i + 1, style(redact_api_key(&citation.url)).dim());
            }
        }

        output.info(format!(
            "{} records from {} data request(s)",
            outcome.total_records(),
            outcome.citations.len()
        ));
    }

    if outcome.kind != TurnKind::ServiceUnavailable {
        for failure in &outcome.failures {
            output.warning(format!(
                "{} could not be fetched: {}",
                failure.key, failure.failure.message
            ));
        }
    }

    if options.explain {
        render_explanation(output, outcome.parsed.as_ref(), outcome.validation.as_ref(), &outcome.plan);

        if !outcome.failures.is_empty() {
            output.section("Failed Requests");
            for failure in &outcome.failures {
                output.kv(&failure.key, &failure.failure);
            }
        }
    }

    Ok(())
}

/// Print what would happen for a question without fetching any data
pub fn render_prepared(output: &OutputWriter, prepared: &PreparedTurn) -> Result<()> {
    if output.is_json() {
        return output.result(DryRunOutput {
            dry_run: true,
            question: prepared.question.clone(),
            route: prepared.chat_kind,
            parsed: prepared.parsed.clone(),
            parse_error: prepared.parse_error.clone(),
            validation: prepared.validation.clone(),
            planned_calls: prepared.plan.clone(),
        });
    }

    output.section("Dry Run");
    output.kv("Question", &prepared.question);
    output.kv("Route", route_label(prepared.chat_kind));

    if let Some(ref failure) = prepared.parse_error {
        output.kv("Parse error", failure);
    }

    render_explanation(
        output,
        prepared.parsed.as_ref(),
        prepared.validation.as_ref(),
        &prepared.plan,
    );

    output.info("Dry run: no data was fetched");
    Ok(())
}

fn render_explanation(
    output: &OutputWriter,
    parsed: Option<&ParsedQuery>,
    validation: Option<&ValidationResult>,
    plan: &[ApiSpec],
) {
    if let Some(parsed) = parsed {
        output.section("Understood Question");
        output.kv("Intent", parsed.intent);
        output.kv("States", list_or_none(&parsed.entities.states));
        output.kv("Crops", list_or_none(&parsed.entities.crops));
        output.kv("Years", list_or_none(&parsed.entities.years));
        output.kv("Metrics", list_or_none(&parsed.entities.metrics));
        if !parsed.time_period.is_empty() {
            output.kv("Time period", &parsed.time_period);
        }
    }

    if let Some(validation) = validation {
        match validation {
            ValidationResult::Valid => output.kv("Validation", "valid"),
            ValidationResult::Invalid { kind, reason, .. } => {
                output.kv("Validation", format!("{} ({})", kind.as_str(), reason))
            }
        }
    }

    if !plan.is_empty() {
        output.section("Planned Data Requests");
        for spec in plan {
            output.kv(spec.api, describe_spec(spec));
        }
    }
}

fn describe_spec(spec: &ApiSpec) -> String {
    let mut parts = Vec::new();
    if !spec.states.is_empty() {
        parts.push(format!("states={}", spec.states.join(", ")));
    }
    if !spec.crops.is_empty() {
        parts.push(format!("crops={}", spec.crops.join(", ")));
    }
    if !spec.years.is_empty() {
        parts.push(format!("years={}", list_or_none(&spec.years)));
    }
    if parts.is_empty() {
        "defaults".to_string()
    } else {
        parts.join(" ")
    }
}

fn list_or_none<T: ToString>(items: &[T]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    }
}

fn route_label(kind: ChatKind) -> &'static str {
    match kind {
        ChatKind::Greeting => "greeting",
        ChatKind::Help => "help",
        ChatKind::Agriculture => "agriculture question",
        ChatKind::General => "general chat",
    }
}
