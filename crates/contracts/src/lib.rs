//! # Contracts
//!
//! Frozen interface contracts shared by every tickcast crate.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Periods and ticks are whole milliseconds (`u64`)
//! - A channel tick is the GCD of its source periods, the global tick the GCD of channel ticks

mod address;
mod blueprint;
mod error;
mod record;
mod source;
mod transport;

pub use address::Endpoint;
pub use blueprint::*;
pub use error::*;
pub use record::Record;
pub use source::{Source, SourceParams};
pub use transport::{SharedTransport, Transport};
