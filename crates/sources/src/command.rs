//! CommandRunner - runs a shell command and captures stdout

use std::process::{Command, Stdio};

use tracing::{debug, instrument};

use crate::error::{Result, SourceError};

/// Shell command executed through `sh -c`
#[derive(Debug, Clone)]
pub struct CommandRunner {
    command: String,
}

impl CommandRunner {
    /// Create a runner for `command`
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Command line
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Run the command to completion and return its stdout
    ///
    /// # Errors
    /// - empty command
    /// - command could not be started
    /// - non-zero exit status
    #[instrument(name = "command_runner_execute", skip(self), fields(command = %self.command))]
    pub fn execute(&self) -> Result<String> {
        if self.command.trim().is_empty() {
            return Err(SourceError::EmptyCommand);
        }

        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| SourceError::CommandSpawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SourceError::command_failed(
                &self.command,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(bytes = stdout.len(), "command finished");
        Ok(stdout)
    }
}
