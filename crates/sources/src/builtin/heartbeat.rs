use std::time::{SystemTime, UNIX_EPOCH};

use contracts::{ContractError, Record, Source, SourceParams, DEFAULT_PERIOD_MS};
use serde::Serialize;
use tracing::trace;

use crate::gate::PeriodGate;

#[derive(Debug, Serialize)]
struct Beat<'a> {
    source: &'a str,
    sequence: u64,
    timestamp_ms: u64,
}

/// Emits one JSON heartbeat record per period
///
/// Params: `label` (defaults to "heartbeat").
#[derive(Debug, Clone)]
pub struct HeartbeatSource {
    label: String,
    sequence: u64,
    gate: PeriodGate,
}

impl HeartbeatSource {
    pub const KIND: &'static str = "heartbeat";

    pub fn new() -> Self {
        Self {
            label: Self::KIND.to_string(),
            sequence: 0,
            gate: PeriodGate::new(DEFAULT_PERIOD_MS),
        }
    }

    /// Beats emitted so far
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl Default for HeartbeatSource {
    fn default() -> Self {
        Self::new()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

impl Source for HeartbeatSource {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn configure(&mut self, params: &SourceParams) -> Result<(), ContractError> {
        if let Some(label) = params.get("label") {
            self.label = label.clone();
        }
        Ok(())
    }

    fn check_ready(&self) -> bool {
        self.gate.is_open()
    }

    fn produce(&mut self) -> Vec<Record> {
        self.gate.mark();
        self.sequence += 1;

        let beat = Beat {
            source: &self.label,
            sequence: self.sequence,
            timestamp_ms: now_ms(),
        };
        match serde_json::to_string(&beat) {
            Ok(json) => {
                trace!(source = %self.label, sequence = self.sequence, "heartbeat");
                vec![Record::new(json)]
            }
            Err(_) => Vec::new(),
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

    #[test]
    fn test_heartbeat_emits_sequenced_json() {
        let mut source = HeartbeatSource::new();
        let mut params = SourceParams::new();
        params.insert("label".to_string(), "station-a".to_string());
        source.configure(&params).unwrap();

        let records = source.produce();
        assert_eq!(records.len(), 1);

        let value: serde_json::Value = serde_json::from_str(records[0].as_str()).unwrap();
        assert_eq!(value["source"], "station-a");
        assert_eq!(value["sequence"], 1);
        assert!(value["timestamp_ms"].as_u64().unwrap() > 0);
    }

    #[test]
    fn test_heartbeat_is_gated_by_period() {
        let mut source = HeartbeatSource::new();
        source.set_period(60_000);

        assert!(source.check_ready());
        source.produce();
        assert!(!source.check_ready());
        assert_eq!(source.sequence(), 1);
    }
}
