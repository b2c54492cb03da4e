//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// tickcast - periodic multi-channel data publisher
#[derive(Parser, Debug)]
#[command(
    name = "tickcast",
    author,
    version,
    about = "Tick-based multi-channel data publisher",
    long_about = "Polls pluggable data sources on a shared tick, batches their records \n\
                  per channel and publishes them on topic-framed transports, \n\
                  throttled by each channel's break settings."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TICKCAST_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "TICKCAST_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Configuration file named by the subcommand, if any
    pub fn config_path(&self) -> Option<&PathBuf> {
        match &self.command {
            Commands::Run(args) => Some(&args.config),
            Commands::Validate(args) => Some(&args.config),
            Commands::Info(args) => Some(&args.config),
            Commands::Listen(_) => None,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scheduler until interrupted
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display channels, derived ticks and sources
    Info(InfoArgs),

    /// Subscribe to a tcp:// publisher and print what arrives
    Listen(ListenArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "tickcast.toml", env = "TICKCAST_CONFIG")]
    pub config: PathBuf,

    /// Stop after this many ticks (0 = unlimited)
    #[arg(long, default_value = "0", env = "TICKCAST_MAX_TICKS")]
    pub max_ticks: u64,

    /// Metrics server port, overriding the configuration (0 = disabled)
    #[arg(long, env = "TICKCAST_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Build every channel and exit without publishing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "tickcast.toml", env = "TICKCAST_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "tickcast.toml", env = "TICKCAST_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `listen` command
#[derive(Parser, Debug)]
pub struct ListenArgs {
    /// Publisher address
    #[arg(short, long, default_value = "tcp://127.0.0.1:5555", env = "TICKCAST_LISTEN_ADDRESS")]
    pub address: String,

    /// Topic prefix filter (empty = everything)
    #[arg(short, long, default_value = "")]
    pub topic: String,

    /// Exit after this many messages (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub count: u64,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
