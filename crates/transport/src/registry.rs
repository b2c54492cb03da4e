//! TransportRegistry - one shared transport per address

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use contracts::{Endpoint, SharedTransport};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::metrics::{TransportMetrics, TransportMetricsSnapshot};
use crate::publishers::{LogPublisher, UdpPublisher, ZmqPublisher};

/// Address-keyed transport cache
///
/// Lookups are by the exact address string. Created transports are unbound;
/// the first channel to publish binds them.
#[derive(Default)]
pub struct TransportRegistry {
    transports: BTreeMap<String, SharedTransport>,
    metrics: BTreeMap<String, Arc<TransportMetrics>>,
}

impl std::fmt::Debug for TransportRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportRegistry")
            .field("addresses", &self.addresses())
            .finish()
    }
}

impl TransportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing transport for `address`, or a new unbound one
    ///
    /// Fails only when the address cannot be parsed.
    #[instrument(name = "transport_registry_get_or_create", skip(self))]
    pub fn get_or_create(&mut self, address: &str) -> Result<SharedTransport> {
        if let Some(existing) = self.transports.get(address) {
            return Ok(Arc::clone(existing));
        }

        let endpoint: Endpoint = address.parse()?;
        let (transport, metrics): (SharedTransport, Arc<TransportMetrics>) = match endpoint {
            Endpoint::Tcp(target) => {
                let publisher = ZmqPublisher::new(address, target);
                let metrics = publisher.metrics();
                (Arc::new(Mutex::new(publisher)), metrics)
            }
            Endpoint::Udp(target) => {
                let publisher = UdpPublisher::new(address, target);
                let metrics = publisher.metrics();
                (Arc::new(Mutex::new(publisher)), metrics)
            }
            Endpoint::Log(label) => {
                let publisher = LogPublisher::new(address, label);
                let metrics = publisher.metrics();
                (Arc::new(Mutex::new(publisher)), metrics)
            }
        };

        debug!(address = %address, "transport created");
        self.transports
            .insert(address.to_string(), Arc::clone(&transport));
        self.metrics.insert(address.to_string(), metrics);
        Ok(transport)
    }

    /// Register an externally built transport, replacing any existing one
    pub fn insert(&mut self, address: impl Into<String>, transport: SharedTransport) {
        let address = address.into();
        self.metrics.remove(&address);
        self.transports.insert(address, transport);
    }

    /// Transport for `address`, if one exists
    pub fn get(&self, address: &str) -> Option<SharedTransport> {
        self.transports.get(address).cloned()
    }

    /// Counters for a transport created by this registry
    pub fn metrics(&self, address: &str) -> Option<Arc<TransportMetrics>> {
        self.metrics.get(address).cloned()
    }

    /// Snapshot of every transport created by this registry
    pub fn snapshots(&self) -> Vec<(String, TransportMetricsSnapshot)> {
        self.metrics
            .iter()
            .map(|(address, metrics)| (address.clone(), metrics.snapshot()))
            .collect()
    }

    /// Known addresses, sorted
    pub fn addresses(&self) -> Vec<&str> {
        self.transports.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }
}
