use crate::output::OutputWriter;
use crate::output_types::ConfigRow;
use anyhow::Result;
use samarth_core::config::{ConfigSource, LayeredConfig};

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    output.section("Configuration");
    output.table(config_rows(config))?;

    if !output.is_json() {
        output.info("Precedence: default < file < environment < cli");
    }
    Ok(())
}

/// Inspection map as rows sorted by key
fn config_rows(config: &LayeredConfig) -> Vec<ConfigRow> {
    let mut rows: Vec<ConfigRow> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow {
            key,
            value,
            source: source_label(source).to_string(),
        })
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));
    rows
}

fn source_label(source: ConfigSource) -> &'static str {
    match source {
        ConfigSource::Default => "default",
        ConfigSource::File => "file",
        ConfigSource::Environment => "environment",
        ConfigSource::Cli => "cli",
    }
}
