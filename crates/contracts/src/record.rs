//! Record - opaque payload produced by sources

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque serializable payload.
///
/// The core never looks inside a record; it only buffers, orders and
/// serializes it as a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(String);

impl Record {
    /// Wrap a payload
    pub fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    /// Borrow the payload
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unwrap the payload
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for Record {
    fn from(payload: String) -> Self {
        Self(payload)
    }
}

impl From<&str> for Record {
    fn from(payload: &str) -> Self {
        Self(payload.to_string())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
