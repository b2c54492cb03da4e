//! Per-transport counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single transport
#[derive(Debug, Default)]
pub struct TransportMetrics {
    /// Messages handed to the wire
    messages_sent: AtomicU64,
    /// Encoded bytes handed to the wire
    bytes_sent: AtomicU64,
    /// Publish calls that failed
    send_failures: AtomicU64,
}

impl TransportMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }

    /// Record one successful message of `bytes` encoded bytes
    pub fn record_sent(&self, bytes: usize) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn send_failures(&self) -> u64 {
        self.send_failures.load(Ordering::Relaxed)
    }

    pub fn inc_send_failures(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> TransportMetricsSnapshot {
        TransportMetricsSnapshot {
            messages_sent: self.messages_sent(),
            bytes_sent: self.bytes_sent(),
            send_failures: self.send_failures(),
        }
    }
}

/// Point-in-time copy of [`TransportMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportMetricsSnapshot {
    pub messages_sent: u64,
    pub bytes_sent: u64,
    pub send_failures: u64,
}
