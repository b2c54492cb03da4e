//! Time gate shared by periodic sources

use std::time::{Duration, Instant};

/// Opens once `period` has elapsed since the last mark
///
/// A fresh gate is open, so a source runs on its first tick.
#[derive(Debug, Clone)]
pub struct PeriodGate {
    period: Duration,
    last_run: Option<Instant>,
}

impl PeriodGate {
    /// Create a gate with the given period (ms)
    pub fn new(period_ms: u64) -> Self {
        Self {
            period: Duration::from_millis(period_ms),
            last_run: None,
        }
    }

    /// Whether the period has elapsed
    pub fn is_open(&self) -> bool {
        self.last_run
            .map_or(true, |last| last.elapsed() >= self.period)
    }

    /// Record a run at the current instant
    pub fn mark(&mut self) {
        self.last_run = Some(Instant::now());
    }

    /// Period in milliseconds
    pub fn period_ms(&self) -> u64 {
        self.period.as_millis() as u64
    }

    /// Change the period, keeping the last mark
    pub fn set_period(&mut self, period_ms: u64) {
        self.period = Duration::from_millis(period_ms);
    }
}
