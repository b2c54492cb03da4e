//! Built-in source kinds

mod async_command;
mod command;
mod heartbeat;
mod idle;

pub use async_command::AsyncCommandSource;
pub use command::CommandSource;
pub use heartbeat::HeartbeatSource;
pub use idle::IdleSource;

use contracts::{ContractError, SourceParams};

/// Fetch a required, non-empty parameter
pub(crate) fn required_param<'a>(
    kind: &str,
    params: &'a SourceParams,
    key: &str,
) -> Result<&'a str, ContractError> {
    params
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ContractError::source_failure(kind, format!("missing parameter '{key}'")))
}
