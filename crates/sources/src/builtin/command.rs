use contracts::{ContractError, Record, Source, SourceParams, DEFAULT_PERIOD_MS};
use tracing::warn;

use super::required_param;
use crate::command::CommandRunner;
use crate::gate::PeriodGate;

/// Runs a shell command synchronously once per period
///
/// The command's stdout becomes a single record. Params: `command` (required).
/// Blocks the tick for the duration of the command; use `async_command` for
/// anything slow.
#[derive(Debug, Clone)]
pub struct CommandSource {
    runner: Option<CommandRunner>,
    gate: PeriodGate,
}

impl CommandSource {
    pub const KIND: &'static str = "command";

    pub fn new() -> Self {
        Self {
            runner: None,
            gate: PeriodGate::new(DEFAULT_PERIOD_MS),
        }
    }
}

impl Default for CommandSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for CommandSource {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn configure(&mut self, params: &SourceParams) -> Result<(), ContractError> {
        let command = required_param(Self::KIND, params, "command")?;
        self.runner = Some(CommandRunner::new(command));
        Ok(())
    }

    fn check_ready(&self) -> bool {
        self.runner.is_some() && self.gate.is_open()
    }

    fn produce(&mut self) -> Vec<Record> {
        let Some(runner) = &self.runner else {
            return Vec::new();
        };

        let outcome = runner.execute();
        self.gate.mark();

        match outcome {
            Ok(output) => vec![Record::new(output)],
            Err(e) => {
                warn!(command = %runner.command(), error = %e, "command source failed");
                Vec::new()
            }
        }
    }

    fn period(&self) -> u64 {
        self.gate.period_ms()
    }

    fn set_period(&mut self, period_ms: u64) {
        self.gate.set_period(period_ms);
    }
}
