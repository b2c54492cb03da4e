//! `info` command implementation.

use anyhow::{Context, Result};
use scheduler::{ChannelManager, ChannelStatus};
use serde::Serialize;
use sources::SourceRegistry;
use tracing::info;
use transport::TransportRegistry;

use super::load_blueprint;
use crate::cli::InfoArgs;

/// Channel layout for JSON output
#[derive(Serialize)]
struct StationInfo {
    global_tick_ms: u64,
    channels: Vec<ChannelStatus>,
    disabled: Vec<String>,
    source_kinds: Vec<String>,
}

/// Execute the `info` command
///
/// Builds every channel without binding any transport.
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Inspecting configuration");
    let blueprint = load_blueprint(&args.config)?;

    let registry = SourceRegistry::with_builtins();
    let mut transports = TransportRegistry::new();
    let mut manager = ChannelManager::from_blueprint(&blueprint, &registry, &mut transports)
        .context("Failed to build channels")?;
    let global_tick_ms = manager.set_global_tick();

    let station = StationInfo {
        global_tick_ms,
        channels: manager.statuses(),
        disabled: blueprint
            .channels
            .iter()
            .filter(|(_, channel)| !channel.enabled)
            .map(|(id, _)| id.clone())
            .collect(),
        source_kinds: registry.kinds().into_iter().map(str::to_string).collect(),
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&station).context("Failed to serialize station info")?;
        println!("{}", json);
    } else {
        print_station(&station);
    }

    Ok(())
}

fn print_station(station: &StationInfo) {
    println!("Global tick: {} ms", station.global_tick_ms);
    println!("Channels: {}", station.channels.len());

    for status in &station.channels {
        let topic = if status.name.is_empty() {
            "<none>"
        } else {
            status.name.as_str()
        };
        println!("\n  [{}]", status.id);
        println!("    address:  {}", status.address);
        println!("    topic:    {}", topic);
        println!("    tick:     {} ms", status.tick_ms);
        println!(
            "    batching: N={} M={} capacity={}",
            status.publishes_per_batch, status.publishes_ignored_after_batch, status.buffer_capacity
        );
        if status.sources.is_empty() {
            println!("    sources:  (none)");
        } else {
            println!("    sources:  {}", status.sources.join(", "));
        }
    }

    if !station.disabled.is_empty() {
        println!("\nDisabled: {}", station.disabled.join(", "));
    }
    println!("\nAvailable source kinds: {}", station.source_kinds.join(", "));
}
