//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::StationBlueprint;
use serde::Serialize;
use sources::SourceRegistry;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::error::{ensure_config_exists, CliError};

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    channel_count: usize,
    enabled_channel_count: usize,
    source_count: usize,
    default_tick_ms: u64,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        Err(CliError::InvalidConfig.into())
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    let loaded = ensure_config_exists(&args.config)
        .map_err(|e| e.to_string())
        .and_then(|_| {
            config_loader::ConfigLoader::load_from_path(&args.config).map_err(|e| e.to_string())
        });

    match loaded {
        Ok(blueprint) => ValidationResult {
            valid: true,
            config_path,
            error: None,
            warnings: collect_warnings(&blueprint, &SourceRegistry::with_builtins()),
            summary: Some(ConfigSummary {
                version: format!("{:?}", blueprint.version),
                channel_count: blueprint.channels.len(),
                enabled_channel_count: blueprint.enabled_channels().count(),
                source_count: blueprint.source_count(),
                default_tick_ms: blueprint.general.default_tick_ms,
            }),
        },
        Err(error) => ValidationResult {
            valid: false,
            config_path,
            error: Some(error),
            warnings: Vec::new(),
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &StationBlueprint, registry: &SourceRegistry) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.enabled_channels().next().is_none() {
        warnings.push("No enabled channels - nothing will be published".to_string());
    }

    for (id, channel) in &blueprint.channels {
        if !channel.enabled {
            warnings.push(format!("Channel '{id}' is disabled"));
            continue;
        }
        if channel.sources.is_empty() {
            warnings.push(format!(
                "Channel '{id}' has no sources - it will tick at the default rate and never publish"
            ));
        }
        for source in &channel.sources {
            if !registry.contains(&source.kind) {
                warnings.push(format!(
                    "Channel '{id}' uses unknown source kind '{}' - it will be skipped",
                    source.kind
                ));
            }
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!(
                "  Channels: {} ({} enabled)",
                summary.channel_count, summary.enabled_channel_count
            );
            println!("  Sources: {}", summary.source_count);
            println!("  Default tick: {} ms", summary.default_tick_ms);
        }

        if !result.warnings.is_empty() {
            println!("\n⚠ Warnings:");
            for warning in &result.warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_warnings_for_unknown_and_empty_channels() {
        let file = write_config(
            r#"
[channels.perf]
name = "PERF"
address = "log://perf"

[[channels.perf.sources]]
kind = "teleport"
period_ms = 500

[channels.empty]
address = "log://empty"

[channels.off]
enabled = false
address = "log://off"
"#,
        );

        let result = validate_config(&ValidateArgs {
            config: file.path().to_path_buf(),
            json: false,
        });

        assert!(result.valid);
        assert_eq!(result.warnings.len(), 3);
        assert!(result.warnings.iter().any(|w| w.contains("teleport")));
        assert!(result.warnings.iter().any(|w| w.contains("'empty' has no sources")));
        assert!(result.warnings.iter().any(|w| w.contains("'off' is disabled")));

        let summary = result.summary.unwrap();
        assert_eq!(summary.channel_count, 3);
        assert_eq!(summary.enabled_channel_count, 2);
    }

    #[test]
    fn test_invalid_decimation_is_reported() {
        let file = write_config(
            r#"
[channels.perf]
address = "log://perf"
publishes_per_batch = 0
"#,
        );

        let result = validate_config(&ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        });
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("channels[perf]"));
    }

    #[test]
    fn test_missing_file() {
        let result = validate_config(&ValidateArgs {
            config: "/nonexistent/tickcast.toml".into(),
            json: false,
        });
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("not found"));
    }
}
