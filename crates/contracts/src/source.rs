//! Source trait - pollable data source abstraction
//!
//! A source is owned by exactly one channel and polled once per channel tick.

use std::collections::HashMap;

use crate::{ContractError, Record};

/// Type-specific source parameters, as written in the configuration file
pub type SourceParams = HashMap<String, String>;

/// Pollable data source
///
/// Readiness is checked every channel tick; `produce` is only called when
/// `check_ready` returns true.
///
/// # Example
///
/// ```ignore
/// let mut source: Box<dyn Source> = registry.create("heartbeat")?;
/// source.set_period(500);
/// if source.check_ready() {
///     for record in source.produce() {
///         buffer.push(record);
///     }
/// }
/// ```
pub trait Source: Send {
    /// Registry kind this source was created from
    fn kind(&self) -> &str;

    /// Apply type-specific parameters after construction
    ///
    /// The default implementation accepts and ignores everything.
    fn configure(&mut self, _params: &SourceParams) -> Result<(), ContractError> {
        Ok(())
    }

    /// Whether the source wants to be polled on this tick
    fn check_ready(&self) -> bool {
        true
    }

    /// Produce zero or more records, in order
    fn produce(&mut self) -> Vec<Record>;

    /// Polling period in milliseconds
    fn period(&self) -> u64;

    /// Set the polling period in milliseconds
    fn set_period(&mut self, period_ms: u64);
}
