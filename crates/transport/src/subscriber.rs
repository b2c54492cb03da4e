//! Subscriber - async ZeroMQ SUB socket for `tcp://` publishers

use contracts::Endpoint;
use tracing::{info, instrument};
use zeromq::{Socket, SocketRecv, SubSocket};

use crate::codec::Message;
use crate::error::{Result, TransportError};

/// Connected subscriber with a topic prefix filter
///
/// An empty filter accepts every message, including untopiced ones.
pub struct Subscriber {
    address: String,
    socket: SubSocket,
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("address", &self.address)
            .finish()
    }
}

impl Subscriber {
    /// Connect to a `tcp://host:port` publisher
    ///
    /// A wildcard host (`*` / `0.0.0.0`) connects to loopback.
    #[instrument(name = "subscriber_connect", skip(topic_filter))]
    pub async fn connect(address: &str, topic_filter: impl Into<String>) -> Result<Self> {
        let target = match address.parse::<Endpoint>()? {
            Endpoint::Tcp(target) => target,
            other => {
                return Err(TransportError::unsupported(
                    address,
                    format!("cannot subscribe to '{}' addresses", other.scheme()),
                ))
            }
        };
        let target = match target.strip_prefix("0.0.0.0:") {
            Some(port) => format!("127.0.0.1:{port}"),
            None => target,
        };

        let mut socket = SubSocket::new();
        socket
            .connect(&format!("tcp://{target}"))
            .await
            .map_err(|source| TransportError::Connect {
                address: address.to_string(),
                source,
            })?;

        let topic_filter = topic_filter.into();
        socket.subscribe(&topic_filter).await?;
        info!(address = %address, topic = %topic_filter, "subscribed");

        Ok(Self {
            address: address.to_string(),
            socket,
        })
    }

    /// Address this subscriber is connected to
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Next message passing the topic filter
    pub async fn recv(&mut self) -> Result<Message> {
        let frames = self.socket.recv().await?.into_vec();
        Message::from_frames(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publishers::ZmqPublisher;
    use contracts::Transport;
    use std::time::{Duration, Instant};
    use tokio::runtime::Runtime;

    /// Publish `messages` until one reaches `subscriber`
    ///
    /// SUB sockets only see messages sent after their subscription has
    /// reached the publisher, so the first rounds may be dropped.
    fn publish_until_received(
        runtime: &Runtime,
        publisher: &mut ZmqPublisher,
        subscriber: &mut Subscriber,
        messages: &[(&str, &[u8])],
    ) -> Message {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            for (topic, payload) in messages {
                publisher.publish(topic, payload).unwrap();
            }
            let received = runtime.block_on(async {
                tokio::time::timeout(Duration::from_millis(100), subscriber.recv()).await
            });
            if let Ok(message) = received {
                return message.unwrap();
            }
            assert!(Instant::now() < deadline, "timed out waiting for message");
        }
    }

    fn bound() -> (ZmqPublisher, String) {
        let mut publisher = ZmqPublisher::new("tcp://127.0.0.1:0", "127.0.0.1:0");
        publisher.bind().unwrap();
        let address = publisher.local_endpoint().unwrap().to_string();
        (publisher, address)
    }

    #[tokio::test]
    async fn test_rejects_non_tcp_addresses() {
        let err = Subscriber::connect("udp://127.0.0.1:9", "").await.unwrap_err();
        assert!(matches!(err, TransportError::Unsupported { .. }));
    }

    #[test]
    fn test_topic_prefix_filter() {
        let runtime = Runtime::new().unwrap();
        let (mut publisher, address) = bound();
        let mut subscriber = runtime
            .block_on(Subscriber::connect(&address, "perf"))
            .unwrap();

        let messages = [
            ("other", b"skip".as_slice()),
            ("", b"untopiced".as_slice()),
            ("perf.cpu", b"[1]".as_slice()),
        ];
        let message = publish_until_received(&runtime, &mut publisher, &mut subscriber, &messages);

        assert_eq!(message.topic, "perf.cpu");
        assert_eq!(message.payload_str(), "[1]");
    }

    #[test]
    fn test_empty_filter_receives_untopiced_messages() {
        let runtime = Runtime::new().unwrap();
        let (mut publisher, address) = bound();
        let mut subscriber = runtime.block_on(Subscriber::connect(&address, "")).unwrap();

        let message =
            publish_until_received(&runtime, &mut publisher, &mut subscriber, &[("", b"bare".as_slice())]);

        assert_eq!(message.topic, "");
        assert_eq!(message.payload_str(), "bare");
    }
}
