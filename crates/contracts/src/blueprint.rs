//! StationBlueprint - Config Loader output
//!
//! Describes the complete publisher configuration: general settings and the
//! channel table with each channel's decimation, buffering and sources.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::SourceParams;

/// Default transport address of a channel
pub const DEFAULT_ADDRESS: &str = "tcp://127.0.0.1:5555";

/// Default source period and default channel tick (ms)
pub const DEFAULT_PERIOD_MS: u64 = 1000;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete publisher blueprint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Process-wide settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Channel id -> channel definition (ordered by id)
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelConfig>,
}

impl StationBlueprint {
    /// Channels with `enabled = true`
    pub fn enabled_channels(&self) -> impl Iterator<Item = (&String, &ChannelConfig)> {
        self.channels.iter().filter(|(_, channel)| channel.enabled)
    }

    /// Total number of configured sources
    pub fn source_count(&self) -> usize {
        self.channels.values().map(|c| c.sources.len()).sum()
    }
}

/// Process-wide settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GeneralSettings {
    /// Verbosity: 0 = warn, 1 = info, >= 2 = debug
    #[serde(default = "default_verbose")]
    #[validate(range(max = 3))]
    pub verbose: u8,

    /// Tick used by channels without sources (ms)
    #[serde(default = "default_period_ms")]
    #[validate(range(min = 1))]
    pub default_tick_ms: u64,

    /// Prometheus exporter port (0 = disabled)
    #[serde(default)]
    pub metrics_port: u16,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            verbose: default_verbose(),
            default_tick_ms: DEFAULT_PERIOD_MS,
            metrics_port: 0,
        }
    }
}

impl GeneralSettings {
    /// Log level implied by `verbose`
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

fn default_verbose() -> u8 {
    1
}

fn default_period_ms() -> u64 {
    DEFAULT_PERIOD_MS
}

/// Channel definition
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChannelConfig {
    /// Disabled channels are skipped when building
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Topic name; empty means no topic frame
    #[serde(default)]
    pub name: String,

    /// Transport address (`tcp://`, `udp://` or `log://`)
    #[serde(default = "default_address")]
    #[validate(length(min = 1))]
    pub address: String,

    /// N: transmissions before a break
    #[serde(default = "default_publishes_per_batch")]
    #[validate(range(min = 1))]
    pub publishes_per_batch: u32,

    /// M: suppressed attempts before transmission resumes
    #[serde(default)]
    pub publishes_ignored_after_batch: u32,

    /// Batching buffer capacity
    #[serde(default = "default_buffer_capacity")]
    #[validate(range(min = 1))]
    pub buffer_capacity: usize,

    /// Ordered source list
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: String::new(),
            address: default_address(),
            publishes_per_batch: default_publishes_per_batch(),
            publishes_ignored_after_batch: 0,
            buffer_capacity: default_buffer_capacity(),
            sources: Vec::new(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_publishes_per_batch() -> u32 {
    1
}

fn default_buffer_capacity() -> usize {
    1
}

/// Source descriptor
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SourceConfig {
    /// Registry kind (e.g. "command")
    #[validate(length(min = 1))]
    pub kind: String,

    /// Polling period (ms), must be > 0
    #[serde(default = "default_period_ms")]
    #[validate(range(min = 1))]
    pub period_ms: u64,

    /// Kind-specific parameters
    #[serde(default)]
    pub params: SourceParams,
}

impl SourceConfig {
    /// Create a descriptor without parameters
    pub fn new(kind: impl Into<String>, period_ms: u64) -> Self {
        Self {
            kind: kind.into(),
            period_ms,
            params: SourceParams::new(),
        }
    }

    /// Add a parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}
