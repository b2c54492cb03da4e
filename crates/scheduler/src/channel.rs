//! Channel - sources, buffer, decimation and a shared transport

use std::sync::{MutexGuard, PoisonError};

use contracts::{SharedTransport, Source, Transport};
use serde::Serialize;
use tracing::{debug, info, instrument, trace};

use crate::buffer::BatchBuffer;
use crate::decimation::{Attempt, BreakState, Decimator};
use crate::error::{Result, SchedulerError};
use crate::runner::run_sources;
use crate::tick::gcd_all;

/// Payload bytes shown in trace logs
const TRACE_PAYLOAD_BYTES: usize = 1000;

fn lock(transport: &SharedTransport) -> MutexGuard<'_, dyn Transport + 'static> {
    transport.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Named stream publishing its buffered records on every successful poll
///
/// Built through [`ChannelBuilder`](crate::ChannelBuilder), which rejects
/// invalid decimation parameters and zero capacity.
pub struct Channel {
    id: String,
    name: String,
    address: String,
    sources: Vec<Box<dyn Source>>,
    buffer: BatchBuffer,
    decimator: Decimator,
    transport: SharedTransport,
    default_tick_ms: u64,
    tick_ms: u64,
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("address", &self.address)
            .field("sources", &self.sources.len())
            .field("buffer", &self.buffer)
            .field("decimator", &self.decimator)
            .field("tick_ms", &self.tick_ms)
            .finish()
    }
}

/// Point-in-time view of a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelStatus {
    pub id: String,
    pub name: String,
    pub address: String,
    pub tick_ms: u64,
    pub sources: Vec<String>,
    pub publishes_per_batch: u32,
    pub publishes_ignored_after_batch: u32,
    pub buffer_capacity: usize,
    pub buffered: usize,
    pub published: u64,
    pub seen: u64,
    pub seen_on_break: u64,
    pub state: BreakState,
}

impl Channel {
    pub(crate) fn new(
        id: String,
        name: String,
        address: String,
        decimator: Decimator,
        buffer: BatchBuffer,
        transport: SharedTransport,
        default_tick_ms: u64,
    ) -> Self {
        Self {
            id,
            name,
            address,
            sources: Vec::new(),
            buffer,
            decimator,
            transport,
            default_tick_ms,
            tick_ms: default_tick_ms,
        }
    }

    /// Configuration key of this channel
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Topic sent ahead of every payload; empty means no topic frame
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// GCD of the source periods, or the default tick without sources
    pub fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn buffer(&self) -> &BatchBuffer {
        &self.buffer
    }

    pub fn decimator(&self) -> &Decimator {
        &self.decimator
    }

    /// Append a source and recompute the tick
    pub fn add_source(&mut self, source: Box<dyn Source>) {
        self.sources.push(source);
        self.update_tick();
    }

    /// Recompute the tick from the current source periods
    pub fn update_tick(&mut self) -> u64 {
        self.tick_ms = gcd_all(self.sources.iter().map(|s| s.period()))
            .filter(|tick| *tick > 0)
            .unwrap_or(self.default_tick_ms);
        self.tick_ms
    }

    /// Current break state
    pub fn state(&self) -> BreakState {
        self.decimator.state()
    }

    /// Zero the decimation counters and return to `Normal`
    pub fn reset(&mut self) {
        self.decimator.reset();
        debug!(channel = %self.id, "channel counters reset");
    }

    pub fn status(&self) -> ChannelStatus {
        ChannelStatus {
            id: self.id.clone(),
            name: self.name.clone(),
            address: self.address.clone(),
            tick_ms: self.tick_ms,
            sources: self.sources.iter().map(|s| s.kind().to_string()).collect(),
            publishes_per_batch: self.decimator.publishes_per_batch(),
            publishes_ignored_after_batch: self.decimator.ignored_after_batch(),
            buffer_capacity: self.buffer.capacity(),
            buffered: self.buffer.len(),
            published: self.decimator.published(),
            seen: self.decimator.seen(),
            seen_on_break: self.decimator.seen_on_break(),
            state: self.decimator.state(),
        }
    }

    fn ensure_bound(&self) -> Result<()> {
        let mut transport = lock(&self.transport);
        if transport.is_bound() {
            return Ok(());
        }

        transport
            .bind()
            .map_err(|source| SchedulerError::Bind {
                channel: self.id.clone(),
                source,
            })?;
        info!(channel = %self.id, address = %self.address, "transport bound");
        Ok(())
    }

    /// One tick of this channel
    ///
    /// Binds the transport on first use, polls ready sources and, if any
    /// record was produced, sends the whole buffer through the decimator.
    /// Returns [`Attempt::Idle`] when no source produced anything.
    #[instrument(name = "channel_publish", skip(self), fields(channel = %self.id))]
    pub fn publish(&mut self) -> Result<Attempt> {
        self.ensure_bound()?;

        let pushed = run_sources(&mut self.sources, &mut self.buffer);
        observability::record_records_buffered(&self.id, pushed);
        observability::record_buffer_depth(&self.id, self.buffer.len());

        if pushed == 0 {
            observability::record_channel_attempt(&self.id, Attempt::Idle.label());
            return Ok(Attempt::Idle);
        }

        let payload = self
            .buffer
            .serialize_batch()
            .map_err(|source| SchedulerError::Encode {
                channel: self.id.clone(),
                source,
            })?;

        let topic = self.name.as_str();
        let transport = &self.transport;
        let outcome = self
            .decimator
            .attempt(|| lock(transport).publish(topic, &payload));

        debug!(
            channel = %self.id,
            state = %self.decimator.describe(),
            records = self.buffer.len(),
            "publish attempt"
        );

        match outcome {
            Ok(attempt) => {
                if attempt == Attempt::Sent {
                    let preview = &payload[..payload.len().min(TRACE_PAYLOAD_BYTES)];
                    trace!(
                        channel = %self.id,
                        address = %self.address,
                        payload = %String::from_utf8_lossy(preview),
                        "published"
                    );
                }
                observability::record_channel_attempt(&self.id, attempt.label());
                Ok(attempt)
            }
            Err(source) => {
                observability::record_channel_attempt(&self.id, "failed");
                Err(SchedulerError::Publish {
                    channel: self.id.clone(),
                    source,
                })
            }
        }
    }
}
