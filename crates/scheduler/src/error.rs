//! Scheduler error types

use contracts::ContractError;
use thiserror::Error;
use transport::TransportError;

/// Scheduler specific errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Channel parameters rejected at construction
    #[error("invalid channel '{channel}': {message}")]
    InvalidChannel { channel: String, message: String },

    /// Transport could not be bound
    #[error("channel '{channel}' failed to bind: {source}")]
    Bind {
        channel: String,
        #[source]
        source: ContractError,
    },

    /// Transmission failed for this tick
    #[error("channel '{channel}' failed to publish: {source}")]
    Publish {
        channel: String,
        #[source]
        source: ContractError,
    },

    /// Batch could not be encoded
    #[error("channel '{channel}' failed to encode batch: {source}")]
    Encode {
        channel: String,
        #[source]
        source: serde_json::Error,
    },

    /// Loop started with no tick to sleep on
    #[error("global tick is 0; no channels configured")]
    ZeroTick,

    /// Tick task panicked or was cancelled
    #[error("tick task failed: {0}")]
    TickTask(#[from] tokio::task::JoinError),

    /// Wrapped TransportError
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl SchedulerError {
    /// Create an invalid channel error
    pub fn invalid_channel(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidChannel {
            channel: channel.into(),
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, SchedulerError>;
