//! UdpPublisher - one datagram per message

use std::io::ErrorKind;
use std::net::UdpSocket;
use std::sync::Arc;

use contracts::{ContractError, Transport};
use tracing::{debug, instrument};

use crate::codec::encode_message;
use crate::metrics::TransportMetrics;

/// Sends each message as a single datagram to `host:port`
///
/// Fire-and-forget: a missing receiver is not an error.
pub struct UdpPublisher {
    address: String,
    target: String,
    socket: Option<UdpSocket>,
    metrics: Arc<TransportMetrics>,
}

impl UdpPublisher {
    pub fn new(address: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            target: target.into(),
            socket: None,
            metrics: Arc::new(TransportMetrics::new()),
        }
    }

    /// Shared counters
    pub fn metrics(&self) -> Arc<TransportMetrics> {
        Arc::clone(&self.metrics)
    }
}

impl Transport for UdpPublisher {
    fn address(&self) -> &str {
        &self.address
    }

    fn is_bound(&self) -> bool {
        self.socket.is_some()
    }

    #[instrument(name = "udp_publisher_bind", skip(self), fields(address = %self.address))]
    fn bind(&mut self) -> Result<(), ContractError> {
        if self.socket.is_some() {
            return Ok(());
        }

        // Bind to any available port
        let socket = UdpSocket::bind("0.0.0.0:0")
            .and_then(|s| s.connect(&self.target).map(|_| s))
            .map_err(|e| ContractError::transport_bind(&self.address, e.to_string()))?;

        debug!(address = %self.address, target = %self.target, "udp publisher connected");
        self.socket = Some(socket);
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), ContractError> {
        let result = match &self.socket {
            None => Err("not bound".to_string()),
            Some(socket) => encode_message(topic, payload)
                .map_err(|e| e.to_string())
                .and_then(|message| {
                    match socket.send(&message) {
                        Ok(_) => Ok(message.len()),
                        // ICMP unreachable from an earlier datagram; nobody is listening yet
                        Err(e) if e.kind() == ErrorKind::ConnectionRefused => {
                            debug!(address = %self.address, "no udp receiver");
                            Ok(message.len())
                        }
                        Err(e) => Err(e.to_string()),
                    }
                }),
        };

        match result {
            Ok(sent) => {
                self.metrics.record_sent(sent);
                Ok(())
            }
            Err(message) => {
                self.metrics.inc_send_failures();
                Err(ContractError::transport_send(&self.address, message))
            }
        }
    }
}
