//! Transport trait - topic-framed pub-sub sender

use std::sync::{Arc, Mutex};

use crate::ContractError;

/// Topic-framed publisher bound to one address
///
/// One transport exists per address; channels sharing an address share the
/// same instance through [`SharedTransport`].
pub trait Transport: Send {
    /// Address this transport publishes on
    fn address(&self) -> &str;

    /// Whether `bind` has succeeded before
    fn is_bound(&self) -> bool;

    /// Bind to the address
    ///
    /// Idempotent: once bound, further calls return `Ok(())` immediately.
    fn bind(&mut self) -> Result<(), ContractError>;

    /// Send a topic frame (omitted when `topic` is empty) followed by one payload frame
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), ContractError>;
}

/// Transport shared between all channels targeting the same address
pub type SharedTransport = Arc<Mutex<dyn Transport>>;
