//! # Integration Tests
//!
//! Cross-crate tests covering:
//! - configuration text to running channels
//! - decimation and buffering observed at the transport
//! - a real TCP publisher and subscriber pair

#[cfg(test)]
mod support {
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};

    use contracts::{ContractError, Record, Source, SourceParams, Transport};
    use sources::SourceRegistry;

    /// Source that yields `"<prefix>-<n>"` on every poll
    pub struct Counter {
        prefix: String,
        count: u64,
        period: u64,
    }

    impl Source for Counter {
        fn kind(&self) -> &str {
            "counter"
        }

        fn configure(&mut self, params: &SourceParams) -> Result<(), ContractError> {
            if let Some(prefix) = params.get("prefix") {
                self.prefix = prefix.clone();
            }
            Ok(())
        }

        fn produce(&mut self) -> Vec<Record> {
            self.count += 1;
            vec![Record::new(format!("{}-{}", self.prefix, self.count))]
        }

        fn period(&self) -> u64 {
            self.period
        }

        fn set_period(&mut self, period_ms: u64) {
            self.period = period_ms;
        }
    }

    /// Built-in kinds plus `counter`
    pub fn registry() -> SourceRegistry {
        let mut registry = SourceRegistry::with_builtins();
        registry.register("counter", || {
            Box::new(Counter {
                prefix: "n".to_string(),
                count: 0,
                period: 1000,
            })
        });
        registry
    }

    /// In-memory transport recording every (topic, payload) it is given
    #[derive(Default)]
    pub struct Recording {
        pub address: String,
        pub bound: bool,
        pub fail: Arc<AtomicBool>,
        pub attempts: Arc<AtomicU64>,
        pub sent: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl Recording {
        pub fn new(address: &str) -> Self {
            Self {
                address: address.to_string(),
                ..Default::default()
            }
        }

        /// Payloads decoded as JSON string arrays
        pub fn batches(sent: &Mutex<Vec<(String, String)>>) -> Vec<Vec<String>> {
            sent.lock()
                .unwrap()
                .iter()
                .map(|(_, payload)| serde_json::from_str(payload).unwrap())
                .collect()
        }
    }

    impl Transport for Recording {
        fn address(&self) -> &str {
            &self.address
        }

        fn is_bound(&self) -> bool {
            self.bound
        }

        fn bind(&mut self) -> Result<(), ContractError> {
            self.bound = true;
            Ok(())
        }

        fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), ContractError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(ContractError::transport_send(&self.address, "injected failure"));
            }
            self.sent.lock().unwrap().push((
                topic.to_string(),
                String::from_utf8(payload.to_vec()).unwrap(),
            ));
            Ok(())
        }
    }
}

#[cfg(test)]
mod config_tests {
    use std::io::Write;

    use config_loader::{ConfigFormat, ConfigLoader};
    use scheduler::ChannelManager;
    use transport::TransportRegistry;

    use crate::support::registry;

    const STATION: &str = r#"
[general]
verbose = 2
default_tick_ms = 400

[channels.perf]
name = "PERF"
address = "log://perf"
publishes_per_batch = 3
publishes_ignored_after_batch = 2
buffer_capacity = 4

[[channels.perf.sources]]
kind = "heartbeat"
period_ms = 500

[[channels.perf.sources]]
kind = "counter"
period_ms = 750

[channels.quiet]
address = "log://quiet"

[channels.off]
enabled = false
address = "log://off"

[[channels.off.sources]]
kind = "idle"
period_ms = 100
"#;

    #[test]
    fn test_config_text_to_channels() {
        let blueprint = ConfigLoader::load_from_str(STATION, ConfigFormat::Toml).unwrap();
        assert_eq!(blueprint.general.log_level(), "debug");

        let mut transports = TransportRegistry::new();
        let mut manager =
            ChannelManager::from_blueprint(&blueprint, &registry(), &mut transports).unwrap();

        assert_eq!(manager.channel_ids(), vec!["perf", "quiet"]);
        assert_eq!(transports.len(), 2);

        // gcd(500, 750) = 250 for perf, default tick 400 for quiet
        let perf = manager.get_channel("perf").unwrap();
        assert_eq!(perf.tick_ms(), 250);
        assert_eq!(perf.source_count(), 2);
        assert_eq!(manager.get_channel("quiet").unwrap().tick_ms(), 400);
        assert_eq!(manager.set_global_tick(), 50);
    }

    #[test]
    fn test_unknown_source_kind_is_skipped() {
        let text = r#"
[channels.a]
address = "log://a"

[[channels.a.sources]]
kind = "teleport"
period_ms = 300

[[channels.a.sources]]
kind = "idle"
period_ms = 900
"#;
        let blueprint = ConfigLoader::load_from_str(text, ConfigFormat::Toml).unwrap();
        let mut transports = TransportRegistry::new();
        let manager =
            ChannelManager::from_blueprint(&blueprint, &registry(), &mut transports).unwrap();

        let channel = manager.get_channel("a").unwrap();
        assert_eq!(channel.source_count(), 1);
        assert_eq!(channel.tick_ms(), 900);
    }

    #[test]
    fn test_config_file_round_trip() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(STATION.as_bytes()).unwrap();

        let from_file = ConfigLoader::load_from_path(file.path()).unwrap();
        let from_str = ConfigLoader::load_from_str(STATION, ConfigFormat::Toml).unwrap();
        assert_eq!(
            ConfigLoader::to_json(&from_file).unwrap(),
            ConfigLoader::to_json(&from_str).unwrap()
        );
    }
}

#[cfg(test)]
mod scheduling_tests {
    use std::sync::atomic::Ordering;
    use std::sync::{Arc, Mutex};

    use contracts::{ChannelConfig, SourceConfig, StationBlueprint};
    use scheduler::{Attempt, ChannelManager};
    use transport::TransportRegistry;

    use crate::support::{registry, Recording};

    fn counter_channel(address: &str, n: u32, m: u32, capacity: usize) -> ChannelConfig {
        ChannelConfig {
            name: "PERF".to_string(),
            address: address.to_string(),
            publishes_per_batch: n,
            publishes_ignored_after_batch: m,
            buffer_capacity: capacity,
            sources: vec![SourceConfig::new("counter", 100)],
            ..Default::default()
        }
    }

    fn build(
        channels: Vec<(&str, ChannelConfig)>,
        recorders: Vec<Recording>,
    ) -> ChannelManager {
        let mut blueprint = StationBlueprint::default();
        for (id, channel) in channels {
            blueprint.channels.insert(id.to_string(), channel);
        }

        let mut transports = TransportRegistry::new();
        for recorder in recorders {
            let address = recorder.address.clone();
            transports.insert(address, Arc::new(Mutex::new(recorder)));
        }

        let mut manager =
            ChannelManager::from_blueprint(&blueprint, &registry(), &mut transports).unwrap();
        manager.set_global_tick();
        manager
    }

    #[test]
    fn test_decimation_observed_at_transport() {
        let recorder = Recording::new("log://perf");
        let sent = Arc::clone(&recorder.sent);
        let mut manager = build(
            vec![("perf", counter_channel("log://perf", 3, 2, 1))],
            vec![recorder],
        );

        for _ in 0..6 {
            assert!(manager.publish());
        }

        let batches = Recording::batches(&sent);
        let sent_ids: Vec<_> = batches.iter().map(|b| b[0].as_str()).collect();
        assert_eq!(sent_ids, vec!["n-1", "n-2", "n-3", "n-6"]);
        assert!(sent.lock().unwrap().iter().all(|(topic, _)| topic == "PERF"));

        let status = &manager.statuses()[0];
        assert_eq!(status.published, 4);
        assert_eq!(status.seen, 6);
    }

    #[test]
    fn test_ring_buffer_carries_evicted_history() {
        let recorder = Recording::new("log://perf");
        let sent = Arc::clone(&recorder.sent);
        let mut manager = build(
            vec![("perf", counter_channel("log://perf", 1, 0, 3))],
            vec![recorder],
        );

        for _ in 0..5 {
            manager.publish();
        }

        // N=1, M=0 sends every other attempt
        let batches = Recording::batches(&sent);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0], vec!["n-1"]);
        assert_eq!(batches[1], vec!["n-1", "n-2", "n-3"]);
        assert_eq!(batches[2], vec!["n-3", "n-4", "n-5"]);

        let channel = manager.get_channel("perf").unwrap();
        assert_eq!(channel.buffer().evicted(), 2);
    }

    #[test]
    fn test_failing_channel_does_not_block_others() {
        let broken = Recording::new("log://broken");
        broken.fail.store(true, Ordering::SeqCst);
        let broken_attempts = Arc::clone(&broken.attempts);

        let healthy = Recording::new("log://healthy");
        let healthy_sent = Arc::clone(&healthy.sent);

        let mut manager = build(
            vec![
                ("a_broken", counter_channel("log://broken", 1, 0, 1)),
                ("b_healthy", counter_channel("log://healthy", 5, 0, 1)),
            ],
            vec![broken, healthy],
        );

        assert!(!manager.publish());
        assert!(!manager.publish());

        assert_eq!(broken_attempts.load(Ordering::SeqCst), 2);
        assert_eq!(healthy_sent.lock().unwrap().len(), 2);

        // Failed transmissions never start a break
        let broken_status = manager.get_channel("a_broken").unwrap().status();
        assert_eq!(broken_status.published, 0);
        assert_eq!(broken_status.seen, 2);
    }

    #[test]
    fn test_idle_channel_never_transmits() {
        let recorder = Recording::new("log://idle");
        let attempts = Arc::clone(&recorder.attempts);
        let channel = ChannelConfig {
            address: "log://idle".to_string(),
            sources: vec![SourceConfig::new("idle", 200)],
            ..Default::default()
        };
        let mut manager = build(vec![("idle", channel)], vec![recorder]);

        for _ in 0..3 {
            assert!(manager.publish());
        }
        assert_eq!(attempts.load(Ordering::SeqCst), 0);

        let channel = manager.get_channel_mut("idle").unwrap();
        assert_eq!(channel.publish().unwrap(), Attempt::Idle);
        assert_eq!(channel.status().seen, 0);
    }
}

#[cfg(test)]
mod network_tests {
    use std::net::TcpListener;
    use std::time::Duration;

    use contracts::{ChannelConfig, SourceConfig, StationBlueprint};
    use scheduler::{ChannelManager, TickLoop};
    use tokio::sync::oneshot;
    use transport::{Subscriber, TransportRegistry};

    use crate::support::registry;

    fn free_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    fn tcp_manager(address: &str) -> ChannelManager {
        let mut blueprint = StationBlueprint::default();
        blueprint.channels.insert(
            "perf".to_string(),
            ChannelConfig {
                name: "PERF".to_string(),
                address: address.to_string(),
                sources: vec![SourceConfig::new("counter", 10).with_param("prefix", "sample")],
                ..Default::default()
            },
        );
        let mut transports = TransportRegistry::new();
        let mut manager =
            ChannelManager::from_blueprint(&blueprint, &registry(), &mut transports).unwrap();
        manager.set_global_tick();
        manager
    }

    /// Subscribe once the tick loop has bound the publisher
    async fn subscribe(address: &str, topic: &str) -> Subscriber {
        for _ in 0..100 {
            if let Ok(subscriber) = Subscriber::connect(address, topic).await {
                return subscriber;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("publisher at {address} never came up");
    }

    #[tokio::test]
    async fn test_tcp_publish_to_subscriber() {
        let address = format!("tcp://127.0.0.1:{}", free_port());
        let mut tick_loop = TickLoop::new(tcp_manager(&address));
        let (stop, stopped) = oneshot::channel::<()>();
        let running = tokio::spawn(async move { tick_loop.run(stopped).await });

        let mut subscriber = subscribe(&address, "PERF").await;
        let received = tokio::time::timeout(Duration::from_secs(5), subscriber.recv())
            .await
            .expect("timed out waiting for batch")
            .unwrap();

        let _ = stop.send(());
        let stats = running.await.unwrap().unwrap();
        assert_eq!(stats.failed_ticks, 0);

        assert_eq!(received.topic, "PERF");
        let batch: Vec<String> = serde_json::from_slice(&received.payload).unwrap();
        assert_eq!(batch.len(), 1);
        assert!(batch[0].starts_with("sample-"));
    }

    #[tokio::test]
    async fn test_tick_loop_with_tcp_channel() {
        let address = format!("tcp://127.0.0.1:{}", free_port());
        let mut tick_loop = TickLoop::new(tcp_manager(&address)).with_max_ticks(Some(4));

        let stats = tick_loop.run(std::future::pending::<()>()).await.unwrap();
        assert_eq!(stats.ticks, 4);
        assert_eq!(stats.failed_ticks, 0);

        let status = &tick_loop.manager().statuses()[0];
        assert_eq!(status.seen, 4);
    }
}
