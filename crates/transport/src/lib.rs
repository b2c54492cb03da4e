//! # Transport
//!
//! Topic-framed publish/subscribe over a small set of address schemes.
//!
//! Responsibilities:
//! - ZeroMQ PUB sockets for `tcp://` addresses, plus `udp://` datagrams and
//!   `log://` dry runs
//! - Datagram codec carrying the same topic and payload frames over UDP
//! - `TransportRegistry`: at most one transport per address, shared by every
//!   channel that targets it
//! - `Subscriber`: async ZeroMQ SUB receiver with topic prefix filtering

pub mod codec;
pub mod error;
pub mod metrics;
pub mod publishers;
pub mod registry;
pub mod subscriber;

pub use codec::{decode_datagram, encode_message, Message};
pub use contracts::{Endpoint, SharedTransport, Transport};
pub use error::{Result, TransportError};
pub use metrics::{TransportMetrics, TransportMetricsSnapshot};
pub use publishers::{LogPublisher, UdpPublisher, ZmqPublisher};
pub use registry::TransportRegistry;
pub use subscriber::Subscriber;
