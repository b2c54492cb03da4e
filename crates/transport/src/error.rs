//! Transport error types

use contracts::ContractError;
use thiserror::Error;

/// Transport specific errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// Malformed frame on the wire
    #[error("codec error: {message}")]
    Codec { message: String },

    /// Frame larger than the codec accepts
    #[error("frame of {len} bytes exceeds limit of {max} bytes")]
    FrameTooLarge { len: usize, max: usize },

    /// Address scheme not usable for this operation
    #[error("unsupported address '{address}': {message}")]
    Unsupported { address: String, message: String },

    /// Could not reach a publisher
    #[error("failed to connect to '{address}': {source}")]
    Connect {
        address: String,
        #[source]
        source: zeromq::ZmqError,
    },

    /// ZeroMQ socket error
    #[error("zmq error: {0}")]
    Zmq(#[from] zeromq::ZmqError),

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl TransportError {
    /// Create a codec error
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }

    /// Create an unsupported address error
    pub fn unsupported(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unsupported {
            address: address.into(),
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, TransportError>;
