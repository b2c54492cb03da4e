//! TickLoop - the cooperative scheduling driver

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use observability::{RunningStats, StatsSummary};
use tokio::task;
use tokio::time::sleep;
use tracing::{info, instrument};

use crate::error::{Result, SchedulerError};
use crate::manager::ChannelManager;

/// Totals reported when the loop stops
#[derive(Debug, Clone, Default)]
pub struct LoopStats {
    /// Ticks executed
    pub ticks: u64,
    /// Ticks in which at least one channel failed
    pub failed_ticks: u64,
    /// Wall time spent in `ChannelManager::publish`, per tick
    pub publish_ms: StatsSummary,
}

impl fmt::Display for LoopStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(f, "Failed ticks: {}", self.failed_ticks)?;
        write!(f, "Publish time (ms): {}", self.publish_ms)
    }
}

/// Publishes every channel, then sleeps one global tick, until stopped
///
/// Ticks never overlap: the full tick is slept after each publish. Each
/// publish runs on the blocking pool, so slow sources and sockets do not
/// stall the runtime the loop is polled on.
#[derive(Debug)]
pub struct TickLoop {
    manager: ChannelManager,
    max_ticks: Option<u64>,
}

impl TickLoop {
    pub fn new(manager: ChannelManager) -> Self {
        Self {
            manager,
            max_ticks: None,
        }
    }

    /// Stop on its own after `max_ticks` ticks
    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn manager(&self) -> &ChannelManager {
        &self.manager
    }

    /// Run until `shutdown` resolves or the tick limit is reached
    ///
    /// Uses the manager's current global tick; fails with
    /// [`SchedulerError::ZeroTick`] if it is 0.
    #[instrument(name = "tick_loop_run", skip_all, fields(tick_ms = self.manager.global_tick_ms()))]
    pub async fn run<F>(&mut self, shutdown: F) -> Result<LoopStats>
    where
        F: Future,
    {
        let tick_ms = self.manager.global_tick_ms();
        if tick_ms == 0 {
            return Err(SchedulerError::ZeroTick);
        }
        let tick = Duration::from_millis(tick_ms);

        tokio::pin!(shutdown);

        let mut stats = LoopStats::default();
        let mut publish_time = RunningStats::default();

        info!(
            tick_ms,
            channels = self.manager.len(),
            max_ticks = ?self.max_ticks,
            "tick loop started"
        );

        let mut stopping = false;
        loop {
            let started = Instant::now();
            let mut manager = std::mem::take(&mut self.manager);
            let mut tick_task = task::spawn_blocking(move || {
                let ok = manager.publish();
                (manager, ok)
            });

            // A shutdown seen mid-tick lets the tick finish first
            let (manager, ok) = loop {
                tokio::select! {
                    biased;
                    joined = &mut tick_task => break joined?,
                    _ = &mut shutdown, if !stopping => stopping = true,
                }
            };
            self.manager = manager;
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

            publish_time.push(elapsed_ms);
            observability::record_tick(elapsed_ms, ok);
            stats.ticks += 1;
            if !ok {
                stats.failed_ticks += 1;
            }

            if self.max_ticks.is_some_and(|max| stats.ticks >= max) {
                info!(ticks = stats.ticks, "tick limit reached");
                break;
            }
            if stopping {
                info!(ticks = stats.ticks, "shutdown requested");
                break;
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!(ticks = stats.ticks, "shutdown requested");
                    break;
                }
                _ = sleep(tick) => {}
            }
        }

        stats.publish_ms = publish_time.summary();
        info!(
            ticks = stats.ticks,
            failed_ticks = stats.failed_ticks,
            avg_publish_ms = stats.publish_ms.mean,
            "tick loop stopped"
        );
        Ok(stats)
    }
}
