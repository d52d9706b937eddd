//! Registry configuration structures.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::DrainPolicy;

/// Environment variable holding the manual-class limit.
pub const ENV_MANUAL_LIMIT: &str = "PROMETHEUS_CONCURRENCY_MANUAL_LIMIT";
/// Environment variable holding the production-class limit.
pub const ENV_PRODUCTION_LIMIT: &str = "PROMETHEUS_CONCURRENCY_PRODUCTION_LIMIT";
/// Environment variable holding the shutdown poll interval in milliseconds.
pub const ENV_POLL_INTERVAL_MS: &str = "PROMETHEUS_SHUTDOWN_POLL_INTERVAL_MS";
/// Environment variable holding the number of polls between progress logs.
pub const ENV_REPORT_EVERY: &str = "PROMETHEUS_SHUTDOWN_REPORT_EVERY";

/// Per-class concurrency limits. Zero or negative means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Cap for executions started manually.
    pub manual_limit: i64,
    /// Cap for every other execution mode.
    pub production_limit: i64,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            manual_limit: -1,
            production_limit: -1,
        }
    }
}

/// Drain loop settings used by shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Milliseconds between drain checks.
    pub poll_interval_ms: u64,
    /// Checks between progress log lines.
    pub report_every: u32,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            report_every: 4,
        }
    }
}

impl ShutdownConfig {
    /// Validate drain settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be greater than 0".into());
        }
        if self.report_every == 0 {
            return Err("report_every must be greater than 0".into());
        }
        Ok(())
    }

    /// Drain policy described by this configuration.
    #[must_use]
    pub fn drain_policy(&self) -> DrainPolicy {
        DrainPolicy::new(Duration::from_millis(self.poll_interval_ms), self.report_every)
    }
}

/// Root registry configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Concurrency caps.
    pub concurrency: ConcurrencyConfig,
    /// Shutdown drain settings.
    pub shutdown: ShutdownConfig,
}

impl RegistryConfig {
    /// Validate all sections.
    pub fn validate(&self) -> Result<(), String> {
        self.shutdown
            .validate()
            .map_err(|e| format!("shutdown invalid: {e}"))
    }

    /// Parse registry configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read configuration from the process environment, loading `.env` first
    /// if one exists. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, String> {
        // a missing .env file is normal
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, using the same keys
    /// as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = parse_var(&lookup, ENV_MANUAL_LIMIT)? {
            cfg.concurrency.manual_limit = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_PRODUCTION_LIMIT)? {
            cfg.concurrency.production_limit = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_POLL_INTERVAL_MS)? {
            cfg.shutdown.poll_interval_ms = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_REPORT_EVERY)? {
            cfg.shutdown.report_every = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, String>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| format!("{key}: invalid value `{raw}`: {e}"))
        })
        .transpose()
}
