//! Builder for [`ExecutionRegistry`] from a [`RegistryConfig`].

use std::sync::Arc;

use crate::config::RegistryConfig;
use crate::core::{
    ConcurrencyControl, EventSink, ExecutionRegistry, PersistenceStore, RegistryError,
    RegistryResult,
};

/// Assembles a registry from a store, a configuration and an optional event sink.
pub struct RegistryBuilder<S> {
    store: S,
    config: RegistryConfig,
    events: Option<Arc<dyn EventSink>>,
}

impl<S> RegistryBuilder<S>
where
    S: PersistenceStore,
{
    /// Start from `store` with the default configuration.
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: RegistryConfig::default(),
            events: None,
        }
    }

    /// Use `config` instead of the defaults.
    #[must_use]
    pub fn with_config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Send admission events of both class queues to `sink`.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = Some(sink);
        self
    }

    /// Validate the configuration and build the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidConfig`] if validation fails.
    pub fn build(self) -> RegistryResult<ExecutionRegistry<S>> {
        self.config
            .validate()
            .map_err(|e| RegistryError::InvalidConfig(format!("config invalid: {e}")))?;

        let mut concurrency = ConcurrencyControl::from_config(&self.config.concurrency);
        if let Some(sink) = self.events {
            concurrency = concurrency.with_event_sink(sink);
        }
        tracing::debug!(
            manual_limit = self.config.concurrency.manual_limit,
            production_limit = self.config.concurrency.production_limit,
            "building execution registry"
        );
        Ok(ExecutionRegistry::new(self.store, concurrency)
            .with_drain_policy(self.config.shutdown.drain_policy()))
    }
}
