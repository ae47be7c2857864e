//! Command implementations

mod ask;
mod catalog;
mod chat;
mod config;
mod doctor;

use crate::cli::{Cli, Commands};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::render::RenderOptions;
use anyhow::{Context, Result};
use samarth_core::config::{CliConfigOverrides, LayeredConfig};
use samarth_data::{DataFetcher, FetcherSettings, ReqwestTransport};
use samarth_llm::{create_generator, GeneratorSettings, TextGenerator};
use samarth_pipeline::QaPipeline;
use std::sync::Arc;

/// Pipeline type used by the interactive commands
pub type CliPipeline = QaPipeline<Box<dyn TextGenerator>>;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_config(
        cli.config.as_deref(),
        CliConfigOverrides {
            llm: cli.llm.clone(),
            no_cache: cli.no_cache,
        },
    )?;

    let options = RenderOptions {
        show_api_urls: config.show_api_urls.value,
        explain: cli.explain,
    };

    match cli.command {
        Commands::Ask(args) => ask::execute(args, &config, &output, options, cli.dry_run).await,
        Commands::Chat => chat::execute(&config, &output, options, cli.dry_run).await,
        Commands::Catalog(args) => catalog::execute(args, &output),
        Commands::Config => config::execute(&config, &output),
        Commands::Doctor(args) => doctor::execute(args, &config, &output).await,
    }
}

/// Build the data fetcher from configuration
pub fn build_fetcher(config: &LayeredConfig) -> Result<DataFetcher> {
    config.require_data_api_key()?;

    let transport = Arc::new(ReqwestTransport::new(config.api_timeout()));
    Ok(DataFetcher::new(transport, FetcherSettings::from_config(config)))
}

/// Build the question answering pipeline from configuration
pub fn build_pipeline(config: &LayeredConfig) -> Result<CliPipeline> {
    let fetcher = build_fetcher(config)?;
    let generator = create_generator(&GeneratorSettings::from_config(config))
        .context("Failed to set up the language model")?;

    Ok(QaPipeline::new(generator, fetcher))
}
