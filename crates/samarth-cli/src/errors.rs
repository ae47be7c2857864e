use console::style;
use samarth_core::SamarthError;
use std::fmt;

/// Error with context and suggestions for the terminal
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// A required key is not configured
pub fn missing_key(key: &str) -> CliError {
    let (env, fallback) = match key {
        "data_api_key" => ("SAMARTH_DATA_API_KEY", "API_KEY"),
        "llm_api_key" => ("SAMARTH_LLM_API_KEY", "GEMINI_KEY"),
        _ => ("", ""),
    };

    let mut error = CliError::new(format!("Missing configuration: {}", key))
        .with_context(format!("The '{}' setting is required for this command.", key));

    if !env.is_empty() {
        error = error
            .with_suggestion(format!("Set it in the environment: export {}=\"...\"", env))
            .with_suggestion(format!("Or use the legacy variable {}", fallback));
    }

    error
        .with_suggestion(format!("Or add it to samarth.toml:\n  {} = \"...\"", key))
        .with_help("Run: samarth doctor")
}

/// The `llm` setting names a provider that does not exist
pub fn unknown_provider(provider: &str, remediation: &str) -> CliError {
    CliError::new(format!("Unknown LLM provider: {}", provider))
        .with_context(format!("Supported providers: {}", remediation))
        .with_suggestion("Use --llm gemini:gemini-2.0-flash")
        .with_suggestion("Or a local model: --llm ollama:llama3")
        .with_help("Run: samarth config")
}

/// A configuration value could not be used
pub fn invalid_config(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration: {}", key))
        .with_context(format!("Configuration value is invalid.\n\nReason: {}", reason))
        .with_suggestion("Check samarth.toml for syntax errors")
        .with_suggestion("Check SAMARTH_* environment variables")
        .with_help("Run: samarth config")
}

/// Context attached to failures reading interactive input
pub const INPUT_ERROR: &str = "Failed to read input";

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    if let Some(samarth_error) = error.downcast_ref::<SamarthError>() {
        let cli_error = match samarth_error {
            SamarthError::ConfigMissing { key } => missing_key(key),
            SamarthError::UnknownProvider {
                provider,
                remediation,
            } => unknown_provider(provider, remediation),
            SamarthError::ConfigInvalid { key, reason } => invalid_config(key, reason),
            other => CliError::new(other.to_string()),
        };

        // Keep the outer context when a command added one
        let outer = error.to_string();
        return if outer != samarth_error.to_string() && cli_error.context.is_none() {
            cli_error.with_context(outer)
        } else {
            cli_error
        };
    }

    let message = format!("{:#}", error);
    if message.starts_with(INPUT_ERROR) {
        CliError::new("Cannot read input")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Run `samarth chat` from an interactive terminal")
            .with_suggestion("Or ask a single question: samarth ask \"...\"")
    } else {
        CliError::new(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_missing_data_key_suggests_env_vars() {
        let error = from_anyhow(anyhow::Error::new(SamarthError::ConfigMissing {
            key: "data_api_key".to_string(),
        }));

        assert_eq!(error.message, "Missing configuration: data_api_key");
        assert!(error.suggestions.iter().any(|s| s.contains("SAMARTH_DATA_API_KEY")));
        assert!(error.suggestions.iter().any(|s| s.contains("API_KEY")));
    }

    #[test]
    fn test_unknown_provider_through_context() {
        let result: Result<(), SamarthError> = Err(SamarthError::UnknownProvider {
            provider: "openai".to_string(),
            remediation: "gemini:<model> or ollama:<model>".to_string(),
        });
        let error = from_anyhow(result.context("Failed to set up the language model").unwrap_err());

        assert_eq!(error.message, "Unknown LLM provider: openai");
        assert!(error.context.unwrap().contains("gemini:<model>"));
    }

    #[test]
    fn test_plain_error_keeps_message() {
        let error = from_anyhow(anyhow::anyhow!("something broke"));
        assert_eq!(error.message, "something broke");
        assert!(error.suggestions.is_empty());
    }
}
