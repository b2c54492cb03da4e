//! Layered error definitions
//!
//! Categorized by origin: config / source / transport

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Source kind was never registered
    #[error("unknown source type '{kind}'")]
    UnknownSourceType { kind: String },

    // ===== Source Errors =====
    /// A source failed to produce data
    #[error("source '{kind}' failed: {message}")]
    SourceFailure { kind: String, message: String },

    // ===== Transport Errors =====
    /// Address could not be parsed
    #[error("invalid transport address '{address}': {message}")]
    InvalidAddress { address: String, message: String },

    /// Binding to the address failed
    #[error("transport bind to '{address}' failed: {message}")]
    TransportBind { address: String, message: String },

    /// Sending a message failed
    #[error("transport send on '{address}' failed: {message}")]
    TransportSend { address: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create unknown source type error
    pub fn unknown_source(kind: impl Into<String>) -> Self {
        Self::UnknownSourceType { kind: kind.into() }
    }

    /// Create source failure error
    pub fn source_failure(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceFailure {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create invalid address error
    pub fn invalid_address(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Create transport bind error
    pub fn transport_bind(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportBind {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Create transport send error
    pub fn transport_send(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportSend {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Whether this error comes from configuration rather than runtime
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse { .. } | Self::ConfigValidation { .. } | Self::UnknownSourceType { .. }
        )
    }
}
