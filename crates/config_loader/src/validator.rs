//! Configuration validation
//!
//! Rules:
//! - general.default_tick_ms > 0, verbose <= 3
//! - publishes_per_batch >= 1 (N), buffer_capacity >= 1
//! - every source period_ms > 0 and kind non-empty
//! - address uses a supported scheme
//!
//! Unknown source kinds are not rejected here; the channel builder skips them.

use contracts::{ContractError, Endpoint, StationBlueprint};
use validator::{Validate, ValidationErrors};

/// Validate a StationBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &StationBlueprint) -> Result<(), ContractError> {
    validate_general(blueprint)?;
    validate_channels(blueprint)?;
    validate_addresses(blueprint)?;
    Ok(())
}

fn to_contract_error(field: impl Into<String>, errors: ValidationErrors) -> ContractError {
    ContractError::config_validation(field, errors.to_string())
}

/// Validate general settings
fn validate_general(blueprint: &StationBlueprint) -> Result<(), ContractError> {
    blueprint
        .general
        .validate()
        .map_err(|e| to_contract_error("general", e))
}

/// Validate channel and source parameters
fn validate_channels(blueprint: &StationBlueprint) -> Result<(), ContractError> {
    for (id, channel) in &blueprint.channels {
        channel
            .validate()
            .map_err(|e| to_contract_error(format!("channels[{id}]"), e))?;

        for (idx, source) in channel.sources.iter().enumerate() {
            source
                .validate()
                .map_err(|e| to_contract_error(format!("channels[{id}].sources[{idx}]"), e))?;
        }
    }
    Ok(())
}

/// Validate transport addresses
fn validate_addresses(blueprint: &StationBlueprint) -> Result<(), ContractError> {
    for (id, channel) in blueprint.enabled_channels() {
        channel.address.parse::<Endpoint>().map_err(|e| {
            ContractError::config_validation(format!("channels[{id}].address"), e.to_string())
        })?;
    }
    Ok(())
}
