//! # Sources
//!
//! Pluggable data source module.
//!
//! Responsibilities:
//! - Name-keyed `SourceRegistry` resolving configuration kinds to instances
//! - Built-in sources (idle, heartbeat, command, async_command)
//! - `PollBridge`: bounded worker pool bridging blocking operations
//!   without stalling the scheduler

pub mod bridge;
pub mod builtin;
pub mod command;
pub mod error;
pub mod gate;
pub mod registry;

pub use bridge::{BlockingJob, PollBridge, DEFAULT_MAX_WORKERS};
pub use builtin::{AsyncCommandSource, CommandSource, HeartbeatSource, IdleSource};
pub use command::CommandRunner;
pub use contracts::{Record, Source, SourceConfig, SourceParams};
pub use error::{Result, SourceError};
pub use gate::PeriodGate;
pub use registry::{SourceConstructor, SourceRegistry};
