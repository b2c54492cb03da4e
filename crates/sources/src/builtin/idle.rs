use contracts::{Record, Source, DEFAULT_PERIOD_MS};

/// Source that never produces records
///
/// Useful as a placeholder to keep a channel's tick alive.
#[derive(Debug, Clone)]
pub struct IdleSource {
    period_ms: u64,
}

impl IdleSource {
    pub const KIND: &'static str = "idle";

    pub fn new() -> Self {
        Self {
            period_ms: DEFAULT_PERIOD_MS,
        }
    }
}

impl Default for IdleSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for IdleSource {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn produce(&mut self) -> Vec<Record> {
        Vec::new()
    }

    fn period(&self) -> u64 {
        self.period_ms
    }

    fn set_period(&mut self, period_ms: u64) {
        self.period_ms = period_ms;
    }
}
