//! Configuration models for concurrency caps and shutdown draining.

pub mod registry;

pub use registry::{ConcurrencyConfig, RegistryConfig, ShutdownConfig};
