//! `listen` command implementation.

use anyhow::{Context, Result};
use tracing::info;
use transport::Subscriber;

use super::shutdown_signal;
use crate::cli::ListenArgs;

/// Execute the `listen` command
pub async fn run_listen(args: &ListenArgs) -> Result<()> {
    let mut subscriber = Subscriber::connect(&args.address, args.topic.as_str())
        .await
        .with_context(|| format!("Failed to subscribe to {}", args.address))?;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut received = 0u64;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!(received, "Interrupted");
                break;
            }
            message = subscriber.recv() => {
                let message = message.context("Failed to receive message")?;

                received += 1;
                if message.topic.is_empty() {
                    println!("{}", message.payload_str());
                } else {
                    println!("[{}] {}", message.topic, message.payload_str());
                }

                if args.count > 0 && received >= args.count {
                    break;
                }
            }
        }
    }

    Ok(())
}
