use super::{build_pipeline, CliPipeline};
use crate::cli::AskArgs;
use crate::output::OutputWriter;
use crate::progress::create_spinner;
use crate::render::{render_prepared, render_turn, RenderOptions};
use anyhow::Result;
use samarth_core::config::LayeredConfig;
use samarth_pipeline::TurnOutcome;

pub async fn execute(
    args: AskArgs,
    config: &LayeredConfig,
    output: &OutputWriter,
    options: RenderOptions,
    dry_run: bool,
) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let question = args.text();

    if dry_run {
        let prepared = pipeline.prepare(&question).await;
        return render_prepared(output, &prepared);
    }

    let outcome = answer_with_spinner(&pipeline, &question, output).await;
    render_turn(output, &outcome, options)
}

/// Run one turn behind a spinner
pub async fn answer_with_spinner(
    pipeline: &CliPipeline,
    question: &str,
    output: &OutputWriter,
) -> TurnOutcome {
    let spinner = create_spinner("Looking up the data...", !output.is_json());
    let outcome = pipeline.answer(question).await;
    spinner.finish_and_clear();

    tracing::info!(
        turn_id = %outcome.turn_id,
        kind = %outcome.kind,
        records = outcome.total_records(),
        "Turn complete"
    );
    outcome
}
