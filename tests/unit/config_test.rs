//! Tests for configuration validation

use std::collections::HashMap;
use std::time::Duration;

use prometheus_active_executions::config::{ConcurrencyConfig, RegistryConfig, ShutdownConfig};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn test_defaults_are_unlimited() {
    let cfg = RegistryConfig::default();
    assert_eq!(cfg.concurrency.manual_limit, -1);
    assert_eq!(cfg.concurrency.production_limit, -1);
    assert_eq!(cfg.shutdown.poll_interval_ms, 500);
    assert_eq!(cfg.shutdown.report_every, 4);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_shutdown_config_invalid_interval() {
    let invalid = ShutdownConfig {
        poll_interval_ms: 0,
        report_every: 4,
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_shutdown_config_invalid_report_every() {
    let invalid = ShutdownConfig {
        poll_interval_ms: 100,
        report_every: 0,
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_drain_policy_from_config() {
    let policy = ShutdownConfig {
        poll_interval_ms: 250,
        report_every: 8,
    }
    .drain_policy();
    assert_eq!(policy.poll_interval(), Duration::from_millis(250));
    assert_eq!(policy.report_every(), 8);
}

#[test]
fn test_registry_config_from_json() {
    let json = r#"{
        "concurrency": { "manual_limit": 2, "production_limit": 10 },
        "shutdown": { "poll_interval_ms": 100 }
    }"#;

    let cfg = RegistryConfig::from_json_str(json).unwrap();
    assert_eq!(
        cfg.concurrency,
        ConcurrencyConfig {
            manual_limit: 2,
            production_limit: 10,
        }
    );
    assert_eq!(cfg.shutdown.poll_interval_ms, 100);
    assert_eq!(cfg.shutdown.report_every, 4);
}

#[test]
fn test_registry_config_from_json_rejects_invalid() {
    assert!(RegistryConfig::from_json_str("{ not json").is_err());
    let err = RegistryConfig::from_json_str(r#"{ "shutdown": { "report_every": 0 } }"#).unwrap_err();
    assert!(err.contains("report_every"));
}

#[test]
fn test_from_lookup_reads_all_keys() {
    let cfg = RegistryConfig::from_lookup(lookup(&[
        ("PROMETHEUS_CONCURRENCY_MANUAL_LIMIT", "3"),
        ("PROMETHEUS_CONCURRENCY_PRODUCTION_LIMIT", " 20 "),
        ("PROMETHEUS_SHUTDOWN_POLL_INTERVAL_MS", "50"),
        ("PROMETHEUS_SHUTDOWN_REPORT_EVERY", "10"),
    ]))
    .unwrap();
    assert_eq!(cfg.concurrency.manual_limit, 3);
    assert_eq!(cfg.concurrency.production_limit, 20);
    assert_eq!(cfg.shutdown.poll_interval_ms, 50);
    assert_eq!(cfg.shutdown.report_every, 10);
}

#[test]
fn test_from_lookup_keeps_defaults_for_unset() {
    let cfg = RegistryConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(cfg, RegistryConfig::default());
}

#[test]
fn test_from_lookup_rejects_garbage() {
    let err = RegistryConfig::from_lookup(lookup(&[("PROMETHEUS_SHUTDOWN_REPORT_EVERY", "often")]))
        .unwrap_err();
    assert!(err.contains("PROMETHEUS_SHUTDOWN_REPORT_EVERY"));
}
