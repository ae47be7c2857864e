//! SAMARTH CLI - ask questions about Indian agriculture and climate data
//!
//! This is the terminal front-end of the SAMARTH pipeline.

mod cli;
mod commands;
mod config_loader;
mod errors;
mod output;
mod output_types;
mod progress;
mod render;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

/// Crates whose logs `--verbose` raises to info
const SAMARTH_TARGETS: &[&str] = &[
    "samarth_core",
    "samarth_llm",
    "samarth_data",
    "samarth_pipeline",
    "samarth_cli",
];

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    let runtime = tokio::runtime::Runtime::new()?;

    if let Err(error) = runtime.block_on(commands::execute(cli)) {
        errors::from_anyhow(error).display();
        std::process::exit(1);
    }

    Ok(())
}

fn default_filter(verbose: bool) -> String {
    if !verbose {
        return "warn".to_string();
    }

    let mut directives = vec!["warn".to_string()];
    directives.extend(SAMARTH_TARGETS.iter().map(|target| format!("{}=info", target)));
    directives.join(",")
}
