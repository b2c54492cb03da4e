//! Source error types

use contracts::ContractError;
use thiserror::Error;

/// Source specific error
#[derive(Debug, Error)]
pub enum SourceError {
    /// No command configured
    #[error("command is empty")]
    EmptyCommand,

    /// Command could not be started
    #[error("failed to start command '{command}': {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Command exited unsuccessfully
    #[error("command '{command}' exited with status {status:?}: {stderr}")]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    /// A bridge job panicked
    #[error("poll worker of bridge '{bridge}' panicked")]
    WorkerPanicked { bridge: String },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl SourceError {
    /// Create command failure error
    pub fn command_failed(
        command: impl Into<String>,
        status: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            status,
            stderr: stderr.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, SourceError>;
