//! ChannelBuilder - validated channel construction

use contracts::{
    ChannelConfig, ContractError, SharedTransport, Source, DEFAULT_ADDRESS, DEFAULT_PERIOD_MS,
};
use sources::SourceRegistry;
use tracing::{debug, instrument, warn};
use transport::TransportRegistry;

use crate::buffer::BatchBuffer;
use crate::channel::Channel;
use crate::decimation::Decimator;
use crate::error::{Result, SchedulerError};

/// Builder for [`Channel`]
///
/// Defaults: empty name, `tcp://127.0.0.1:5555`, N = 1, M = 0, capacity 1,
/// default tick 1000 ms.
pub struct ChannelBuilder {
    id: String,
    name: String,
    address: String,
    publishes_per_batch: u32,
    ignored_after_batch: u32,
    buffer_capacity: usize,
    default_tick_ms: u64,
    sources: Vec<Box<dyn Source>>,
}

impl ChannelBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            address: DEFAULT_ADDRESS.to_string(),
            publishes_per_batch: 1,
            ignored_after_batch: 0,
            buffer_capacity: 1,
            default_tick_ms: DEFAULT_PERIOD_MS,
            sources: Vec::new(),
        }
    }

    /// Topic name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Transmit `publishes_per_batch` times, then ignore `ignored_after_batch` attempts
    pub fn decimation(mut self, publishes_per_batch: u32, ignored_after_batch: u32) -> Self {
        self.publishes_per_batch = publishes_per_batch;
        self.ignored_after_batch = ignored_after_batch;
        self
    }

    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Tick used while the channel has no sources
    pub fn default_tick(mut self, tick_ms: u64) -> Self {
        self.default_tick_ms = tick_ms;
        self
    }

    pub fn source(mut self, source: Box<dyn Source>) -> Self {
        self.sources.push(source);
        self
    }

    /// Validate parameters and build the channel on `transport`
    pub fn build(self, transport: SharedTransport) -> Result<Channel> {
        let decimator = Decimator::new(self.publishes_per_batch, self.ignored_after_batch)
            .ok_or_else(|| {
                SchedulerError::invalid_channel(&self.id, "publishes_per_batch must be >= 1")
            })?;
        if self.buffer_capacity == 0 {
            return Err(SchedulerError::invalid_channel(
                &self.id,
                "buffer_capacity must be >= 1",
            ));
        }
        if self.default_tick_ms == 0 {
            return Err(SchedulerError::invalid_channel(
                &self.id,
                "default tick must be >= 1 ms",
            ));
        }

        let mut channel = Channel::new(
            self.id,
            self.name,
            self.address,
            decimator,
            BatchBuffer::new(self.buffer_capacity),
            transport,
            self.default_tick_ms,
        );
        for source in self.sources {
            channel.add_source(source);
        }
        Ok(channel)
    }

    /// Build a channel from its configuration entry
    ///
    /// Sources that fail to resolve or configure are skipped with a warning;
    /// the channel keeps the rest. The transport comes from `transports`, so
    /// channels on the same address share it.
    #[instrument(
        name = "channel_builder_from_config",
        skip(config, sources, transports),
        fields(sources = config.sources.len(), address = %config.address)
    )]
    pub fn from_config(
        id: &str,
        config: &ChannelConfig,
        sources: &SourceRegistry,
        transports: &mut TransportRegistry,
        default_tick_ms: u64,
    ) -> Result<Channel> {
        let mut builder = Self::new(id)
            .name(&config.name)
            .address(&config.address)
            .decimation(
                config.publishes_per_batch,
                config.publishes_ignored_after_batch,
            )
            .buffer_capacity(config.buffer_capacity)
            .default_tick(default_tick_ms);

        for (index, source_config) in config.sources.iter().enumerate() {
            match sources.build(source_config) {
                Ok(source) => {
                    debug!(
                        channel = %id,
                        kind = %source_config.kind,
                        period_ms = source_config.period_ms,
                        "source added"
                    );
                    builder = builder.source(source);
                }
                Err(ContractError::UnknownSourceType { kind }) => {
                    warn!(channel = %id, index, kind = %kind, "unknown source kind, skipping");
                }
                Err(e) => {
                    warn!(channel = %id, index, kind = %source_config.kind, error = %e, "source configuration failed, skipping");
                }
            }
        }

        let transport = transports.get_or_create(&config.address)?;
        builder.build(transport)
    }
}
