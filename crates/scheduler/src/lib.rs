//! # Scheduler
//!
//! Tick-based multi-channel publication.
//!
//! Responsibilities:
//! - `BatchBuffer`: fixed-capacity record ring, oldest evicted on overflow
//! - `Decimator`: per-channel break state machine throttling transmissions
//! - `Channel`: sources + buffer + decimator + shared transport
//! - `ChannelManager`: global tick (GCD of channel ticks) and per-tick publish
//! - `TickLoop`: async driver that publishes, then sleeps one global tick
//!
//! ## Example
//!
//! ```ignore
//! use scheduler::{ChannelManager, TickLoop};
//!
//! let mut manager = ChannelManager::from_blueprint(&blueprint, &sources, &mut transports)?;
//! manager.set_global_tick();
//! let stats = TickLoop::new(manager).run(tokio::signal::ctrl_c()).await?;
//! ```

mod buffer;
mod builder;
mod channel;
mod decimation;
mod driver;
mod error;
mod manager;
mod runner;
pub mod tick;

pub use buffer::BatchBuffer;
pub use builder::ChannelBuilder;
pub use channel::{Channel, ChannelStatus};
pub use decimation::{Attempt, BreakState, Decimator};
pub use driver::{LoopStats, TickLoop};
pub use error::{Result, SchedulerError};
pub use manager::ChannelManager;
pub use runner::run_sources;
