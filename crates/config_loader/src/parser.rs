//! Text to blueprint, no validation

use std::path::Path;

use contracts::{ContractError, StationBlueprint};

/// Station file syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Match an extension, case-insensitively
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("toml") {
            Some(Self::Toml)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else {
            None
        }
    }

    /// Format implied by the extension of `path`
    pub fn from_path(path: &Path) -> Result<Self, ContractError> {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Err(ContractError::config_parse(format!(
                "{} has no extension; expected .toml or .json",
                path.display()
            )));
        };
        Self::from_extension(ext)
            .ok_or_else(|| ContractError::config_parse(format!("unsupported config format: .{ext}")))
    }
}

pub fn parse_toml(text: &str) -> Result<StationBlueprint, ContractError> {
    toml::from_str(text).map_err(|e| ContractError::ConfigParse {
        message: format!("invalid TOML: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse_json(text: &str) -> Result<StationBlueprint, ContractError> {
    serde_json::from_str(text).map_err(|e| ContractError::ConfigParse {
        message: format!("invalid JSON: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Deserialize `text` in `format`
pub fn parse(text: &str, format: ConfigFormat) -> Result<StationBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(text),
        ConfigFormat::Json => parse_json(text),
    }
}
