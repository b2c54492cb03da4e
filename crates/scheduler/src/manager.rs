//! ChannelManager - owns every channel and drives one publish per tick

use std::collections::BTreeMap;

use contracts::StationBlueprint;
use sources::SourceRegistry;
use tracing::{debug, error, info, instrument};
use transport::TransportRegistry;

use crate::builder::ChannelBuilder;
use crate::channel::{Channel, ChannelStatus};
use crate::error::Result;
use crate::tick::gcd_all;

/// Channel map plus the derived global tick
///
/// The global tick is only recomputed by [`ChannelManager::set_global_tick`],
/// never implicitly when channels are added or removed.
#[derive(Debug, Default)]
pub struct ChannelManager {
    channels: BTreeMap<String, Channel>,
    global_tick_ms: u64,
}

impl ChannelManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every enabled channel of a blueprint
    ///
    /// Disabled channels are skipped. Any channel that fails to build aborts
    /// the whole build. The global tick is left at 0 until
    /// [`set_global_tick`](Self::set_global_tick) is called.
    #[instrument(
        name = "channel_manager_from_blueprint",
        skip_all,
        fields(channels = blueprint.channels.len())
    )]
    pub fn from_blueprint(
        blueprint: &StationBlueprint,
        sources: &SourceRegistry,
        transports: &mut TransportRegistry,
    ) -> Result<Self> {
        let default_tick = blueprint.general.default_tick_ms;
        let mut manager = Self::new();

        for (id, config) in &blueprint.channels {
            if !config.enabled {
                debug!(channel = %id, "channel disabled, skipping");
                continue;
            }
            let channel =
                ChannelBuilder::from_config(id, config, sources, transports, default_tick)?;
            info!(
                channel = %id,
                address = %channel.address(),
                tick_ms = channel.tick_ms(),
                sources = channel.source_count(),
                "channel configured"
            );
            manager.insert_channel(id.clone(), channel);
        }

        Ok(manager)
    }

    /// Add or replace a channel
    ///
    /// Returns the channel previously stored under `id`.
    pub fn insert_channel(&mut self, id: impl Into<String>, channel: Channel) -> Option<Channel> {
        self.channels.insert(id.into(), channel)
    }

    /// Remove a channel; returns whether it existed
    pub fn remove_channel(&mut self, id: &str) -> bool {
        self.channels.remove(id).is_some()
    }

    pub fn get_channel(&self, id: &str) -> Option<&Channel> {
        self.channels.get(id)
    }

    pub fn get_channel_mut(&mut self, id: &str) -> Option<&mut Channel> {
        self.channels.get_mut(id)
    }

    /// Channel ids in publish order
    pub fn channel_ids(&self) -> Vec<&str> {
        self.channels.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Recompute the global tick as the GCD of every channel tick
    ///
    /// Yields 0 when there are no channels; callers must not sleep on it.
    pub fn set_global_tick(&mut self) -> u64 {
        self.global_tick_ms = gcd_all(self.channels.values().map(Channel::tick_ms)).unwrap_or(0);
        info!(
            global_tick_ms = self.global_tick_ms,
            channels = self.channels.len(),
            "global tick set"
        );
        self.global_tick_ms
    }

    /// Last value computed by [`set_global_tick`](Self::set_global_tick)
    pub fn global_tick_ms(&self) -> u64 {
        self.global_tick_ms
    }

    /// Publish every channel once, in id order
    ///
    /// A failing channel is logged and the rest still run. Returns true only
    /// if every channel succeeded.
    pub fn publish(&mut self) -> bool {
        let mut all_ok = true;

        for (id, channel) in self.channels.iter_mut() {
            if let Err(e) = channel.publish() {
                error!(channel = %id, error = %e, "channel publish failed");
                all_ok = false;
            }
        }

        all_ok
    }

    /// Reset the decimation counters of every channel
    pub fn reset_all(&mut self) {
        for channel in self.channels.values_mut() {
            channel.reset();
        }
    }

    /// Status of every channel, in id order
    pub fn statuses(&self) -> Vec<ChannelStatus> {
        self.channels.values().map(Channel::status).collect()
    }
}
