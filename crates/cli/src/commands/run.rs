//! `run` command implementation.

use anyhow::{Context, Result};
use scheduler::{ChannelManager, LoopStats, TickLoop};
use sources::SourceRegistry;
use tracing::{info, warn};
use transport::TransportRegistry;

use super::{load_blueprint, shutdown_signal};
use crate::cli::RunArgs;
use crate::error::CliError;

/// Execute the `run` command
pub async fn run_scheduler(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");
    let blueprint = load_blueprint(&args.config)?;

    let sources = SourceRegistry::with_builtins();
    let mut transports = TransportRegistry::new();
    let mut manager = ChannelManager::from_blueprint(&blueprint, &sources, &mut transports)
        .context("Failed to build channels")?;
    let global_tick = manager.set_global_tick();

    info!(
        channels = manager.len(),
        transports = transports.len(),
        global_tick_ms = global_tick,
        "Configuration loaded"
    );

    if global_tick == 0 {
        return Err(CliError::NoChannels.into());
    }

    if args.dry_run {
        info!("Dry run mode - channels built, exiting");
        print_channel_summary(&manager);
        return Ok(());
    }

    let metrics_port = args.metrics_port.unwrap_or(blueprint.general.metrics_port);
    if metrics_port != 0 {
        observability::init_metrics_only(metrics_port)?;
    }

    let max_ticks = (args.max_ticks > 0).then_some(args.max_ticks);
    let mut tick_loop = TickLoop::new(manager).with_max_ticks(max_ticks);

    info!("Starting tick loop...");
    let stats = tick_loop
        .run(shutdown_signal())
        .await
        .context("Tick loop failed")?;

    print_stats(&stats, &transports);

    // Dropping the manager joins poll workers and closes sockets
    tokio::task::spawn_blocking(move || drop((tick_loop, transports)))
        .await
        .context("Failed to release channels")?;
    info!("tickcast finished");
    Ok(())
}

fn print_channel_summary(manager: &ChannelManager) {
    println!("\n=== Channels ===\n");
    println!("Global tick: {} ms", manager.global_tick_ms());
    for status in manager.statuses() {
        println!(
            "  - {} [{}] topic={:?} tick={}ms N={} M={} capacity={} sources={:?}",
            status.id,
            status.address,
            status.name,
            status.tick_ms,
            status.publishes_per_batch,
            status.publishes_ignored_after_batch,
            status.buffer_capacity,
            status.sources,
        );
    }
    println!();
}

fn print_stats(stats: &LoopStats, transports: &TransportRegistry) {
    println!("\n=== Run Statistics ===\n");
    println!("{stats}");

    let snapshots = transports.snapshots();
    if !snapshots.is_empty() {
        println!("\nTransports:");
        for (address, snapshot) in snapshots {
            println!(
                "  - {}: messages={} bytes={} failures={}",
                address, snapshot.messages_sent, snapshot.bytes_sent, snapshot.send_failures
            );
            if snapshot.send_failures > 0 {
                warn!(address = %address, failures = snapshot.send_failures, "transport reported failures");
            }
        }
    }
    println!();
}
