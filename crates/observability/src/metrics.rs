//! Scheduler metric helpers
//!
//! Thin wrappers over the `metrics` facade so metric names live in one place.
//! Every helper is a no-op until a recorder is installed.

use metrics::{counter, gauge, histogram};

/// Record one completed tick
pub fn record_tick(duration_ms: f64, success: bool) {
    counter!("tickcast_ticks_total").increment(1);
    if !success {
        counter!("tickcast_ticks_failed_total").increment(1);
    }
    histogram!("tickcast_tick_duration_ms").record(duration_ms);
}

/// Record a channel publish attempt
///
/// `outcome` is one of `sent`, `suppressed`, `failed`, `idle`.
pub fn record_channel_attempt(channel: &str, outcome: &'static str) {
    counter!(
        "tickcast_channel_attempts_total",
        "channel" => channel.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record records pushed into a channel buffer during one tick
pub fn record_records_buffered(channel: &str, count: usize) {
    if count == 0 {
        return;
    }
    counter!(
        "tickcast_records_buffered_total",
        "channel" => channel.to_string()
    )
    .increment(count as u64);
}

/// Record the current number of buffered records
pub fn record_buffer_depth(channel: &str, depth: usize) {
    gauge!(
        "tickcast_buffer_depth",
        "channel" => channel.to_string()
    )
    .set(depth as f64);
}

/// Frozen view of a [`RunningStats`]
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            return f.write_str("N/A");
        }
        write!(
            f,
            "mean={:.3} std={:.3} [{:.3}..{:.3}] over {} ticks",
            self.mean, self.std_dev, self.min, self.max, self.count
        )
    }
}

/// Streaming sample statistics, constant memory
///
/// Mean and variance use Welford's update.
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    range: Option<(f64, f64)>,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.range = Some(match self.range {
            Some((lo, hi)) => (lo.min(value), hi.max(value)),
            None => (value, value),
        });
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased sample variance; 0 below two samples
    pub fn variance(&self) -> f64 {
        match self.count {
            0 | 1 => 0.0,
            n => self.m2 / (n - 1) as f64,
        }
    }

    pub fn min(&self) -> f64 {
        self.range.map_or(0.0, |(lo, _)| lo)
    }

    pub fn max(&self) -> f64 {
        self.range.map_or(0.0, |(_, hi)| hi)
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            count: self.count,
            min: self.min(),
            max: self.max(),
            mean: self.mean,
            std_dev: self.variance().sqrt(),
        }
    }
}
