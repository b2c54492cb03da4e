//! LogPublisher - records transmissions through tracing

use std::sync::Arc;

use contracts::{ContractError, Transport};
use tracing::{info, trace};

use crate::metrics::TransportMetrics;

const PREVIEW_BYTES: usize = 1000;

/// Transport that only logs; useful for dry runs and debugging
pub struct LogPublisher {
    address: String,
    label: String,
    bound: bool,
    metrics: Arc<TransportMetrics>,
}

impl LogPublisher {
    pub fn new(address: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            label: label.into(),
            bound: false,
            metrics: Arc::new(TransportMetrics::new()),
        }
    }

    /// Shared counters
    pub fn metrics(&self) -> Arc<TransportMetrics> {
        Arc::clone(&self.metrics)
    }
}

impl Transport for LogPublisher {
    fn address(&self) -> &str {
        &self.address
    }

    fn is_bound(&self) -> bool {
        self.bound
    }

    fn bind(&mut self) -> Result<(), ContractError> {
        if !self.bound {
            info!(transport = %self.label, "log publisher ready");
            self.bound = true;
        }
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), ContractError> {
        if !self.bound {
            self.metrics.inc_send_failures();
            return Err(ContractError::transport_send(&self.address, "not bound"));
        }

        info!(
            transport = %self.label,
            topic = %topic,
            bytes = payload.len(),
            "message published"
        );
        let preview = &payload[..payload.len().min(PREVIEW_BYTES)];
        trace!(transport = %self.label, payload = %String::from_utf8_lossy(preview));

        self.metrics.record_sent(payload.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_publisher_requires_bind() {
        let mut publisher = LogPublisher::new("log://debug", "debug");
        assert!(publisher.publish("t", b"x").is_err());

        publisher.bind().unwrap();
        assert!(publisher.is_bound());
        publisher.publish("t", b"x").unwrap();
        assert_eq!(publisher.metrics().messages_sent(), 1);
    }
}
