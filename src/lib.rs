//! # Prometheus Active Executions
//!
//! Admission control and lifecycle tracking for in-flight workflow executions.
//!
//! Every execution a process runs passes through an [`ExecutionRegistry`]:
//! it is persisted, waits for a slot in its concurrency class, is tracked while
//! the engine runs it, and is removed exactly once with its final result.
//!
//! ## Key Features
//!
//! - **Per-class caps**: manual runs and production runs are limited independently
//! - **FIFO admission**: saturated classes park callers and wake them in arrival order
//! - **Cooperative stop**: running executions are asked to cancel through their run handle
//! - **Shared completion**: any number of waiters observe the same final result
//! - **Graceful shutdown**: optional cancel-all, then drain until nothing is active
//!
//! ## Example
//!
//! ```rust,ignore
//! use prometheus_active_executions::builders::RegistryBuilder;
//! use prometheus_active_executions::config::RegistryConfig;
//! use prometheus_active_executions::core::{ExecutionMode, ExecutionResult, ExecutionSpec};
//! use prometheus_active_executions::infra::InMemoryStore;
//! use tokio_util::sync::CancellationToken;
//!
//! let registry = RegistryBuilder::new(InMemoryStore::new())
//!     .with_config(RegistryConfig::from_env()?)
//!     .build()?;
//!
//! let id = registry.add(ExecutionSpec::new("wf-1", ExecutionMode::Webhook), None).await?;
//! let token = CancellationToken::new();
//! registry.attach_run_handle(&id, token.clone())?;
//! // ... engine runs the workflow ...
//! registry.remove(&id, Some(ExecutionResult::finished(serde_json::json!({}))));
//! ```
//!
//! [`ExecutionRegistry`]: core::ExecutionRegistry

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Admission queues, the execution registry, and their collaborator traits.
pub mod core;
/// Configuration models for concurrency caps and shutdown.
pub mod config;
/// Builders to construct registries from configuration.
pub mod builders;
/// Infrastructure adapters for persistence backends.
pub mod infra;
/// Shared utilities.
pub mod util;
