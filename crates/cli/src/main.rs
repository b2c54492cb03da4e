//! # tickcast CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Configuration loading and validation
//! - The tick loop with graceful shutdown
//! - A subscriber for inspecting published streams

mod cli;
mod commands;
mod error;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_listen, run_scheduler, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "tickcast starting");

    let result = match &cli.command {
        Commands::Run(args) => run_scheduler(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
        Commands::Listen(args) => run_listen(args).await,
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging from CLI flags, falling back to the configuration's verbosity
fn init_logging(cli: &Cli) -> Result<()> {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => configured_level(cli).unwrap_or("info"),
            1 => "debug",
            _ => "trace",
        }
    };

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: None,
        default_log_level: default_log_level.to_string(),
    })
}

/// `general.verbose` of the configuration file, if it loads
fn configured_level(cli: &Cli) -> Option<&'static str> {
    let path = cli.config_path()?;
    config_loader::ConfigLoader::load_from_path(path)
        .ok()
        .map(|blueprint| blueprint.general.log_level())
}
