//! ZmqPublisher - ZeroMQ PUB socket for `tcp://` addresses

use std::sync::Arc;

use bytes::Bytes;
use contracts::{ContractError, Transport};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, instrument};
use zeromq::{PubSocket, Socket, SocketSend, ZmqMessage};

use crate::metrics::TransportMetrics;

/// Multipart message: topic frame (omitted when empty), then payload frame
pub fn multipart(topic: &str, payload: &[u8]) -> ZmqMessage {
    let mut message = ZmqMessage::from(Bytes::copy_from_slice(payload));
    if !topic.is_empty() {
        message.push_front(Bytes::copy_from_slice(topic.as_bytes()));
    }
    message
}

/// Binds a PUB socket on `host:port` and sends every message to it
///
/// Subscribers filter by topic prefix on their side of the socket. Publishing
/// with no subscribers succeeds and the message is discarded.
///
/// The socket is driven by a private single-worker runtime. `bind` and
/// `publish` block on it, so they must be called from plain threads or
/// `spawn_blocking`, never from inside async code.
pub struct ZmqPublisher {
    address: String,
    endpoint: String,
    runtime: Option<Runtime>,
    socket: Option<PubSocket>,
    local_endpoint: Option<String>,
    metrics: Arc<TransportMetrics>,
}

impl ZmqPublisher {
    /// Create an unbound publisher for `address`, whose socket part is `target`
    pub fn new(address: impl Into<String>, target: impl AsRef<str>) -> Self {
        Self {
            address: address.into(),
            endpoint: format!("tcp://{}", target.as_ref()),
            runtime: None,
            socket: None,
            local_endpoint: None,
            metrics: Arc::new(TransportMetrics::new()),
        }
    }

    /// Shared counters
    pub fn metrics(&self) -> Arc<TransportMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Endpoint actually bound, with the resolved port when 0 was requested
    pub fn local_endpoint(&self) -> Option<&str> {
        self.local_endpoint.as_deref()
    }
}

impl Transport for ZmqPublisher {
    fn address(&self) -> &str {
        &self.address
    }

    fn is_bound(&self) -> bool {
        self.socket.is_some()
    }

    #[instrument(name = "zmq_publisher_bind", skip(self), fields(address = %self.address))]
    fn bind(&mut self) -> Result<(), ContractError> {
        if self.socket.is_some() {
            return Ok(());
        }

        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("tickcast-zmq")
            .enable_all()
            .build()
            .map_err(|e| ContractError::transport_bind(&self.address, e.to_string()))?;

        let endpoint = self.endpoint.as_str();
        let (socket, bound) = runtime
            .block_on(async {
                let mut socket = PubSocket::new();
                let bound = socket.bind(endpoint).await?;
                Ok::<_, zeromq::ZmqError>((socket, bound))
            })
            .map_err(|e| ContractError::transport_bind(&self.address, e.to_string()))?;

        info!(address = %self.address, local = %bound, "zmq publisher bound");
        self.local_endpoint = Some(bound.to_string());
        self.socket = Some(socket);
        self.runtime = Some(runtime);
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), ContractError> {
        let (Some(runtime), Some(socket)) = (&self.runtime, self.socket.as_mut()) else {
            self.metrics.inc_send_failures();
            return Err(ContractError::transport_send(&self.address, "not bound"));
        };

        match runtime.block_on(socket.send(multipart(topic, payload))) {
            Ok(()) => {
                self.metrics.record_sent(topic.len() + payload.len());
                Ok(())
            }
            Err(e) => {
                debug!(address = %self.address, error = %e, "zmq send failed");
                self.metrics.inc_send_failures();
                Err(ContractError::transport_send(&self.address, e.to_string()))
            }
        }
    }
}

impl Drop for ZmqPublisher {
    fn drop(&mut self) {
        let Some(runtime) = self.runtime.take() else {
            return;
        };
        {
            let _context = runtime.enter();
            drop(self.socket.take());
        }
        // Safe from async contexts, unlike dropping the runtime outright
        runtime.shutdown_background();
    }
}
