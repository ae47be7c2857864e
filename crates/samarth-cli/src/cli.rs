use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SAMARTH - questions and answers over Indian agriculture data
#[derive(Parser, Debug)]
#[command(name = "samarth")]
#[command(
    about = "Ask questions about Indian rainfall, crop production and irrigation data",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./samarth.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show the parsed question, validation and plan alongside the answer
    #[arg(long, global = true)]
    pub explain: bool,

    /// Parse, validate and plan without fetching any data
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Log pipeline progress to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Language model to use (e.g., "gemini:gemini-2.0-flash", "ollama:llama3")
    #[arg(long, global = true, value_name = "SPEC")]
    pub llm: Option<String>,

    /// Disable the response cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a single question
    Ask(AskArgs),

    /// Start an interactive question session
    Chat,

    /// Show the states, crops and years the datasets cover
    Catalog(CatalogArgs),

    /// Show the effective configuration and where each value came from
    Config,

    /// Run health checks and diagnostics
    Doctor(DoctorArgs),
}

#[derive(Parser, Debug)]
pub struct AskArgs {
    /// The question text
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,
}

impl AskArgs {
    /// The question with shell word splitting undone
    pub fn text(&self) -> String {
        self.question.join(" ")
    }
}

#[derive(Parser, Debug)]
pub struct CatalogArgs {
    /// Which part of the catalog to show
    #[arg(value_enum, default_value = "coverage")]
    pub section: CatalogSection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CatalogSection {
    /// States and union territories with their rainfall subdivision
    States,
    /// Common crops and water-usage coverage
    Crops,
    /// Meteorological subdivisions and the states they cover
    Subdivisions,
    /// Year ranges of each dataset
    Coverage,
}

#[derive(Parser, Debug)]
pub struct DoctorArgs {
    /// Also probe each dataset endpoint with a one-record request
    #[arg(long)]
    pub online: bool,
}
