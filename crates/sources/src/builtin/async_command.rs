use contracts::{ContractError, Record, Source, SourceParams, DEFAULT_PERIOD_MS};
use tracing::trace;

use super::required_param;
use crate::bridge::{PollBridge, DEFAULT_MAX_WORKERS};
use crate::command::CommandRunner;
use crate::gate::PeriodGate;

/// Runs a shell command on a `PollBridge` so slow commands never stall a tick
///
/// Each open period requests one poll; records appear on the first tick after
/// a worker completes. Params: `command` (required), `max_workers` (>= 1,
/// defaults to 5).
#[derive(Debug)]
pub struct AsyncCommandSource {
    bridge: Option<PollBridge<String>>,
    gate: PeriodGate,
}

impl AsyncCommandSource {
    pub const KIND: &'static str = "async_command";

    pub fn new() -> Self {
        Self {
            bridge: None,
            gate: PeriodGate::new(DEFAULT_PERIOD_MS),
        }
    }

    /// The underlying bridge, once configured
    pub fn bridge(&self) -> Option<&PollBridge<String>> {
        self.bridge.as_ref()
    }
}

impl Default for AsyncCommandSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for AsyncCommandSource {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn configure(&mut self, params: &SourceParams) -> Result<(), ContractError> {
        let command = required_param(Self::KIND, params, "command")?;

        let max_workers = match params.get("max_workers") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(ContractError::source_failure(
                        Self::KIND,
                        format!("max_workers must be a positive integer, got '{raw}'"),
                    ))
                }
            },
            None => DEFAULT_MAX_WORKERS,
        };

        let runner = CommandRunner::new(command);
        let name = format!("{}:{}", Self::KIND, command);
        self.bridge = Some(PollBridge::new(name, max_workers, move || runner.execute()));
        Ok(())
    }

    fn check_ready(&self) -> bool {
        self.bridge.is_some() && self.gate.is_open()
    }

    fn produce(&mut self) -> Vec<Record> {
        let Some(bridge) = &self.bridge else {
            return Vec::new();
        };

        self.gate.mark();
        bridge.request_poll();

        if bridge.has_new_data() {
            let latest = bridge.get_latest();
            trace!(bridge = %bridge.name(), bytes = latest.len(), "async command result");
            vec![Record::new(latest)]
        } else {
            Vec::new()
        }
    }

    fn period(&self) -> u64 {
        self.gate.period_ms()
    }

    fn set_period(&mut self, period_ms: u64) {
        self.gate.set_period(period_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::{Duration, Instant};

    fn params(pairs: &[(&str, &str)]) -> SourceParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_rejects_invalid_worker_count() {
        let mut source = AsyncCommandSource::new();
        let err = source
            .configure(&params(&[("command", "true"), ("max_workers", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("max_workers"));
    }

    #[test]
    fn test_defaults_to_five_workers() {
        let mut source = AsyncCommandSource::new();
        source.configure(&params(&[("command", "true")])).unwrap();
        assert_eq!(source.bridge().unwrap().max_workers(), DEFAULT_MAX_WORKERS);
    }

    #[test]
    fn test_result_arrives_on_a_later_tick() {
        let mut source = AsyncCommandSource::new();
        source
            .configure(&params(&[("command", "printf polled"), ("max_workers", "1")]))
            .unwrap();
        source.set_period(1);

        let deadline = Instant::now() + Duration::from_secs(5);
        let records = loop {
            let records = source.produce();
            if !records.is_empty() {
                break records;
            }
            assert!(Instant::now() < deadline, "no result from async command");
            thread::sleep(Duration::from_millis(10));
        };

        assert_eq!(records, vec![Record::new("polled")]);
    }
}
