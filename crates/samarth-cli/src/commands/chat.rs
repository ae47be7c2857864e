use super::ask::answer_with_spinner;
use super::build_pipeline;
use crate::errors::INPUT_ERROR;
use crate::output::OutputWriter;
use crate::render::{render_prepared, render_turn, RenderOptions};
use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use samarth_core::config::LayeredConfig;
use samarth_pipeline::classifier::HELP_REPLY;

const EXIT_WORDS: &[&str] = &["exit", "quit"];

pub async fn execute(
    config: &LayeredConfig,
    output: &OutputWriter,
    options: RenderOptions,
    dry_run: bool,
) -> Result<()> {
    // One pipeline for the whole session so the response cache is shared
    let pipeline = build_pipeline(config)?;

    if !output.is_json() {
        println!("\n{}", style("Project SAMARTH").bold().underlined());
        println!("{}", HELP_REPLY);
        println!("{}\n", style("Type 'exit' or 'quit' to leave.").dim());
    }

    let mut turns = 0usize;
    loop {
        let line: String = Input::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()
            .context(INPUT_ERROR)?;

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if EXIT_WORDS.iter().any(|w| question.eq_ignore_ascii_case(w)) {
            break;
        }

        turns += 1;
        let rendered = if dry_run {
            let prepared = pipeline.prepare(question).await;
            render_prepared(output, &prepared)
        } else {
            let outcome = answer_with_spinner(&pipeline, question, output).await;
            render_turn(output, &outcome, options)
        };

        // A failed render must not end the session
        if let Err(e) = rendered {
            output.error(format!("Could not display the answer: {:#}", e));
        }

        if !output.is_json() {
            println!();
        }
    }

    tracing::info!(turns, "Chat session ended");
    if !output.is_json() {
        println!("Goodbye!");
    }
    Ok(())
}
