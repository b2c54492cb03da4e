//! SourceRegistry - kind name to constructor lookup
//!
//! The registry is the only place that knows concrete source types; everything
//! downstream holds `Box<dyn Source>`.

use std::collections::BTreeMap;
use std::fmt;

use contracts::{ContractError, Source, SourceConfig};
use tracing::{debug, instrument};

use crate::builtin::{AsyncCommandSource, CommandSource, HeartbeatSource, IdleSource};

/// Produces a fresh, unconfigured source
pub type SourceConstructor = Box<dyn Fn() -> Box<dyn Source> + Send + Sync>;

/// Name-keyed source factory
#[derive(Default)]
pub struct SourceRegistry {
    constructors: BTreeMap<String, SourceConstructor>,
}

impl fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl SourceRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in kinds
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(IdleSource::KIND, || Box::new(IdleSource::new()));
        registry.register(HeartbeatSource::KIND, || Box::new(HeartbeatSource::new()));
        registry.register(CommandSource::KIND, || Box::new(CommandSource::new()));
        registry.register(AsyncCommandSource::KIND, || {
            Box::new(AsyncCommandSource::new())
        });
        registry
    }

    /// Register a constructor, replacing any previous one for `kind`
    pub fn register<F>(&mut self, kind: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn Source> + Send + Sync + 'static,
    {
        let kind = kind.into();
        debug!(kind = %kind, "source kind registered");
        self.constructors.insert(kind, Box::new(constructor));
    }

    /// Create an unconfigured instance of `kind`
    pub fn create(&self, kind: &str) -> Result<Box<dyn Source>, ContractError> {
        self.constructors
            .get(kind)
            .map(|constructor| constructor())
            .ok_or_else(|| ContractError::unknown_source(kind))
    }

    /// Create, configure and time a source from its configuration entry
    #[instrument(
        name = "source_registry_build",
        skip(self, config),
        fields(kind = %config.kind, period_ms = config.period_ms)
    )]
    pub fn build(&self, config: &SourceConfig) -> Result<Box<dyn Source>, ContractError> {
        let mut source = self.create(&config.kind)?;
        source.configure(&config.params)?;
        source.set_period(config.period_ms);
        Ok(source)
    }

    /// Whether `kind` is registered
    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Registered kind names, sorted
    pub fn kinds(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Record, SourceParams};

    struct FixedSource {
        period: u64,
        payload: String,
    }

    impl Source for FixedSource {
        fn kind(&self) -> &str {
            "fixed"
        }

        fn configure(&mut self, params: &SourceParams) -> Result<(), ContractError> {
            if let Some(payload) = params.get("payload") {
                self.payload = payload.clone();
            }
            Ok(())
        }

        fn produce(&mut self) -> Vec<Record> {
            vec![Record::new(self.payload.clone())]
        }

        fn period(&self) -> u64 {
            self.period
        }

        fn set_period(&mut self, period_ms: u64) {
            self.period = period_ms;
        }
    }

    fn fixed() -> Box<dyn Source> {
        Box::new(FixedSource {
            period: 0,
            payload: String::new(),
        })
    }

    #[test]
    fn test_builtins_are_registered() {
        let registry = SourceRegistry::with_builtins();
        assert_eq!(
            registry.kinds(),
            vec!["async_command", "command", "heartbeat", "idle"]
        );
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let registry = SourceRegistry::with_builtins();
        let err = registry.create("nonexistent").err().unwrap();
        assert!(matches!(err, ContractError::UnknownSourceType { ref kind } if kind == "nonexistent"));
    }

    #[test]
    fn test_build_configures_and_sets_period() {
        let mut registry = SourceRegistry::new();
        registry.register("fixed", fixed);

        let config = SourceConfig::new("fixed", 1500).with_param("payload", "hello");
        let mut source = registry.build(&config).unwrap();

        assert_eq!(source.period(), 1500);
        assert_eq!(source.produce(), vec![Record::new("hello")]);
    }

    #[test]
    fn test_register_replaces_existing_kind() {
        let mut registry = SourceRegistry::with_builtins();
        registry.register("idle", fixed);
        assert_eq!(registry.create("idle").unwrap().kind(), "fixed");
    }

    #[test]
    fn test_build_propagates_configure_errors() {
        let registry = SourceRegistry::with_builtins();
        let config = SourceConfig::new("command", 1000);
        assert!(registry.build(&config).is_err());
    }
}
