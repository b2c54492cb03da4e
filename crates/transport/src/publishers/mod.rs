//! Transport implementations, one per address scheme

mod log;
mod udp;
mod zmq;

pub use log::LogPublisher;
pub use udp::UdpPublisher;
pub use zmq::{multipart, ZmqPublisher};
