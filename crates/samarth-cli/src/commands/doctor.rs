use super::build_fetcher;
use crate::cli::DoctorArgs;
use crate::output::OutputWriter;
use crate::output_types::{CheckStatus, DoctorCheck, DoctorOutput};
use crate::progress::{create_spinner, finish_success};
use anyhow::Result;
use console::style;
use samarth_core::config::{ConfigSource, LayeredConfig};
use samarth_core::models::ApiKind;
use samarth_llm::ProviderSpec;

pub async fn execute(args: DoctorArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let mut checks = configuration_checks(config);

    if args.online {
        checks.extend(endpoint_checks(config, output).await);
    }

    let passed = checks.iter().filter(|c| c.status == CheckStatus::Pass).count();
    let total = checks.len();

    if output.is_json() {
        return output.result(DoctorOutput {
            checks,
            passed,
            total,
        });
    }

    print_report(&checks, passed, total, args.online);
    Ok(())
}

fn configuration_checks(config: &LayeredConfig) -> Vec<DoctorCheck> {
    let mut checks = Vec::new();

    checks.push(if config.data_api_key.value.is_empty() {
        check(
            "Configuration",
            "Data portal key",
            CheckStatus::Fail,
            "Not set",
            Some("Set: export SAMARTH_DATA_API_KEY=\"...\" (or API_KEY)".to_string()),
        )
    } else {
        check(
            "Configuration",
            "Data portal key",
            CheckStatus::Pass,
            format!("Set ({})", source_name(config.data_api_key.source)),
            None,
        )
    });

    match ProviderSpec::parse(&config.llm.value) {
        Ok(spec) => {
            checks.push(check(
                "Language Model",
                "Provider",
                CheckStatus::Pass,
                spec.to_string(),
                None,
            ));

            match spec {
                ProviderSpec::Gemini { .. } if config.llm_api_key.value.is_empty() => {
                    checks.push(check(
                        "Language Model",
                        "Gemini key",
                        CheckStatus::Fail,
                        "Not set",
                        Some("Set: export SAMARTH_LLM_API_KEY=\"...\" (or GEMINI_KEY)".to_string()),
                    ))
                }
                ProviderSpec::Gemini { .. } => checks.push(check(
                    "Language Model",
                    "Gemini key",
                    CheckStatus::Pass,
                    format!("Set ({})", source_name(config.llm_api_key.source)),
                    None,
                )),
                ProviderSpec::Ollama { ref model } => checks.push(check(
                    "Language Model",
                    "Ollama server",
                    CheckStatus::Warn,
                    format!("{} (not contacted)", config.ollama_url.value),
                    Some(format!("Make sure it is running: ollama pull {}", model)),
                )),
            }
        }
        Err(e) => checks.push(check(
            "Language Model",
            "Provider",
            CheckStatus::Fail,
            e.to_string(),
            Some("Use --llm gemini:<model> or --llm ollama:<model>".to_string()),
        )),
    }

    checks.push(if config.enable_caching.value {
        check(
            "Configuration",
            "Response cache",
            CheckStatus::Pass,
            format!("Enabled, TTL {}s", config.cache_ttl_secs.value),
            None,
        )
    } else {
        check(
            "Configuration",
            "Response cache",
            CheckStatus::Warn,
            "Disabled",
            Some("Repeated questions will hit the data portal every time".to_string()),
        )
    });

    checks
}

/// One-record probe of each dataset endpoint
async fn endpoint_checks(config: &LayeredConfig, output: &OutputWriter) -> Vec<DoctorCheck> {
    let fetcher = match build_fetcher(config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            return vec![check(
                "Data Portal",
                "Endpoints",
                CheckStatus::Fail,
                format!("Skipped: {}", e),
                Some("Set the data portal key first".to_string()),
            )]
        }
    };

    let spinner = create_spinner("Probing data.gov.in endpoints...", !output.is_json());
    let mut checks = Vec::new();

    for api in [ApiKind::Rainfall, ApiKind::Crops, ApiKind::Water] {
        spinner.set_message(format!("Probing {} endpoint...", api));
        let name = api.dataset_label();

        checks.push(match fetcher.probe(api).await {
            Ok(records) => check(
                "Data Portal",
                name,
                CheckStatus::Pass,
                format!("Reachable ({} record(s) returned)", records),
                None,
            ),
            Err(failure) => {
                tracing::warn!(api = %api, error = %failure, "Endpoint probe failed");
                check(
                    "Data Portal",
                    name,
                    CheckStatus::Fail,
                    failure.message,
                    Some(failure.detail),
                )
            }
        });
    }

    finish_success(&spinner, "Endpoint probes finished");
    checks
}

fn print_report(checks: &[DoctorCheck], passed: usize, total: usize, online: bool) {
    println!("\n{}", style("SAMARTH Health Check").bold().underlined());
    println!("{}", style("═".repeat(60)).dim());

    let mut group = "";
    for c in checks {
        if c.group != group {
            group = c.group;
            println!();
            println!("{}", style(group).bold());
            println!("{}", style("─".repeat(60)).dim());
        }

        let icon = match c.status {
            CheckStatus::Pass => style("✓").green(),
            CheckStatus::Warn => style("⚠").yellow(),
            CheckStatus::Fail => style("✗").red(),
        };
        println!("{} {}: {}", icon, c.name, c.detail);
        if let Some(ref hint) = c.hint {
            println!("  → {}", hint);
        }
    }

    if !online {
        println!();
        println!("{}", style("Run with --online to probe the data portal.").dim());
    }

    println!();
    println!("{}", style("═".repeat(60)).dim());

    let percentage = if total == 0 { 100 } else { passed * 100 / total };
    let status_icon = if percentage >= 80 {
        style("✓").green()
    } else if percentage >= 50 {
        style("⚠").yellow()
    } else {
        style("✗").red()
    };

    println!(
        "{} Overall Status: {}/{} checks passed ({}%)",
        status_icon, passed, total, percentage
    );
    println!();

    if passed < total {
        println!(
            "{}",
            style("Some issues were found. Follow the suggestions above to fix them.").yellow()
        );
    } else {
        println!("{}", style("All checks passed! SAMARTH is ready to answer questions.").green());
    }
}

fn check(
    group: &'static str,
    name: impl Into<String>,
    status: CheckStatus,
    detail: impl Into<String>,
    hint: Option<String>,
) -> DoctorCheck {
    DoctorCheck {
        group,
        name: name.into(),
        status,
        detail: detail.into(),
        hint,
    }
}

fn source_name(source: ConfigSource) -> &'static str {
    match source {
        ConfigSource::Default => "default",
        ConfigSource::File => "from samarth.toml",
        ConfigSource::Environment => "from environment",
        ConfigSource::Cli => "from command line",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_fail() {
        let config = LayeredConfig::with_defaults();
        let checks = configuration_checks(&config);

        let data_key = checks.iter().find(|c| c.name == "Data portal key").unwrap();
        assert_eq!(data_key.status, CheckStatus::Fail);
        let gemini_key = checks.iter().find(|c| c.name == "Gemini key").unwrap();
        assert_eq!(gemini_key.status, CheckStatus::Fail);
    }

    #[test]
    fn test_bad_provider_fails() {
        let mut config = LayeredConfig::with_defaults();
        config.llm.update("openai:gpt".to_string(), ConfigSource::Cli);

        let checks = configuration_checks(&config);
        let provider = checks.iter().find(|c| c.name == "Provider").unwrap();
        assert_eq!(provider.status, CheckStatus::Fail);
        assert!(!checks.iter().any(|c| c.name == "Gemini key"));
    }

    #[test]
    fn test_ollama_is_a_warning() {
        let mut config = LayeredConfig::with_defaults();
        config.llm.update("ollama:llama3".to_string(), ConfigSource::Cli);

        let checks = configuration_checks(&config);
        let server = checks.iter().find(|c| c.name == "Ollama server").unwrap();
        assert_eq!(server.status, CheckStatus::Warn);
    }
}
