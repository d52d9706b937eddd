//! Tests for builder modules

use std::sync::Arc;
use std::time::Duration;

use prometheus_active_executions::builders::RegistryBuilder;
use prometheus_active_executions::config::{ConcurrencyConfig, RegistryConfig, ShutdownConfig};
use prometheus_active_executions::core::{
    AdmissionAction, EventSink, ExecutionMode, ExecutionSpec, InMemoryEventSink, RegistryError,
};
use prometheus_active_executions::infra::InMemoryStore;

#[test]
fn test_builder_defaults() {
    let registry = RegistryBuilder::new(InMemoryStore::new()).build().unwrap();
    let stats = registry.stats();
    assert_eq!(stats.manual.capacity, None);
    assert_eq!(stats.other.capacity, None);
    assert!(registry.is_empty());
}

#[test]
fn test_builder_applies_limits() {
    let config = RegistryConfig {
        concurrency: ConcurrencyConfig {
            manual_limit: 2,
            production_limit: 5,
        },
        shutdown: ShutdownConfig::default(),
    };
    let registry = RegistryBuilder::new(InMemoryStore::new())
        .with_config(config)
        .build()
        .unwrap();
    assert_eq!(registry.concurrency().queue_for(ExecutionMode::Manual).capacity(), Some(2));
    assert_eq!(registry.concurrency().queue_for(ExecutionMode::Cli).capacity(), Some(5));
}

#[test]
fn test_builder_rejects_invalid_config() {
    let config = RegistryConfig {
        concurrency: ConcurrencyConfig::default(),
        shutdown: ShutdownConfig {
            poll_interval_ms: 0,
            report_every: 1,
        },
    };
    let result = RegistryBuilder::new(InMemoryStore::new())
        .with_config(config)
        .build();
    assert!(matches!(result, Err(RegistryError::InvalidConfig(msg)) if msg.contains("poll_interval_ms")));
}

#[tokio::test]
async fn test_builder_wires_event_sink() {
    let sink = Arc::new(InMemoryEventSink::new(16));
    let registry = RegistryBuilder::new(InMemoryStore::new())
        .with_config(RegistryConfig {
            shutdown: ShutdownConfig {
                poll_interval_ms: 5,
                report_every: 1,
            },
            ..RegistryConfig::default()
        })
        .with_event_sink(Arc::clone(&sink) as Arc<dyn EventSink>)
        .build()
        .unwrap();

    let id = registry
        .add(ExecutionSpec::new("wf", ExecutionMode::Manual), None)
        .await
        .unwrap();
    registry.remove(&id, None);

    let actions: Vec<AdmissionAction> = sink.events().iter().map(|e| e.action).collect();
    assert_eq!(actions, vec![AdmissionAction::Admitted, AdmissionAction::Released]);

    tokio::time::timeout(Duration::from_secs(1), registry.shutdown(false))
        .await
        .unwrap();
}
