//! # Config Loader
//!
//! Turns a station file into a validated [`StationBlueprint`].
//!
//! Pipeline: read, parse (TOML or JSON by extension), expand `$(VAR)`
//! placeholders, validate.
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let station = ConfigLoader::load_from_path(Path::new("tickcast.toml"))?;
//! for (id, channel) in station.enabled_channels() {
//!     println!("{id} -> {}", channel.address);
//! }
//! # Ok::<(), contracts::ContractError>(())
//! ```

mod env;
mod parser;
mod validator;

pub use contracts::StationBlueprint;
pub use env::replace_placeholders;
pub use parser::ConfigFormat;

use std::path::Path;

use contracts::ContractError;

/// Stateless entry point for station configuration
pub struct ConfigLoader;

impl ConfigLoader {
    /// Read and load a station file; `.toml` and `.json` are recognised
    pub fn load_from_path(path: &Path) -> Result<StationBlueprint, ContractError> {
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path)?;
        Self::load_from_str(&text, format)
    }

    /// Load station text already in memory
    ///
    /// Placeholders are expanded after parsing, so they may only appear
    /// inside string values.
    pub fn load_from_str(
        text: &str,
        format: ConfigFormat,
    ) -> Result<StationBlueprint, ContractError> {
        let mut station = parser::parse(text, format)?;
        env::expand_blueprint(&mut station)?;
        validator::validate(&station)?;
        Ok(station)
    }

    /// Render a blueprint as TOML
    pub fn to_toml(station: &StationBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(station)
            .map_err(|e| ContractError::config_parse(format!("cannot render TOML: {e}")))
    }

    /// Render a blueprint as pretty JSON
    pub fn to_json(station: &StationBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(station)
            .map_err(|e| ContractError::config_parse(format!("cannot render JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const STATION: &str = r#"
[general]
verbose = 2

[channels.perf]
name = "PERF"
address = "tcp://127.0.0.1:5555"
publishes_per_batch = 3
publishes_ignored_after_batch = 2
buffer_capacity = 4

[[channels.perf.sources]]
kind = "heartbeat"
period_ms = 1000

[[channels.perf.sources]]
kind = "command"
period_ms = 1500
params = { command = "echo hi" }
"#;

    #[test]
    fn test_loads_channels_and_sources() {
        let station = ConfigLoader::load_from_str(STATION, ConfigFormat::Toml).unwrap();
        assert_eq!(station.general.verbose, 2);
        let perf = &station.channels["perf"];
        assert_eq!(perf.publishes_per_batch, 3);
        assert_eq!(perf.sources.len(), 2);
        assert_eq!(perf.sources[1].params["command"], "echo hi");
    }

    #[test]
    fn test_rendered_toml_and_json_load_back() {
        let station = ConfigLoader::load_from_str(STATION, ConfigFormat::Toml).unwrap();

        let toml_text = ConfigLoader::to_toml(&station).unwrap();
        let from_toml = ConfigLoader::load_from_str(&toml_text, ConfigFormat::Toml).unwrap();
        assert_eq!(from_toml.channels["perf"].sources[1].period_ms, 1500);

        let json_text = ConfigLoader::to_json(&station).unwrap();
        let from_json = ConfigLoader::load_from_str(&json_text, ConfigFormat::Json).unwrap();
        assert_eq!(from_json.channels["perf"].name, "PERF");
    }

    #[test]
    fn test_zero_publishes_per_batch_is_rejected() {
        let err = ConfigLoader::load_from_str(
            "[channels.bad]\npublishes_per_batch = 0\n",
            ConfigFormat::Toml,
        )
        .unwrap_err();
        assert!(err.to_string().contains("publishes_per_batch"));
    }

    #[test]
    fn test_file_format_follows_extension() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(STATION.as_bytes()).unwrap();

        let station = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(station.channels.len(), 1);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }
}
