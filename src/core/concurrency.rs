//! Per-class concurrency control.

use std::sync::Arc;

use crate::config::ConcurrencyConfig;
use crate::core::admission_queue::{AdmissionQueue, QueueStats};
use crate::core::events::EventSink;
use crate::core::execution::{ConcurrencyClass, ExecutionMode};

/// Owns one [`AdmissionQueue`] per [`ConcurrencyClass`] and routes modes to them.
pub struct ConcurrencyControl {
    manual: AdmissionQueue,
    other: AdmissionQueue,
}

impl ConcurrencyControl {
    /// Create queues with the given limits (zero or less means unlimited).
    #[must_use]
    pub fn new(manual_limit: i64, production_limit: i64) -> Self {
        Self {
            manual: AdmissionQueue::new(ConcurrencyClass::Manual, manual_limit),
            other: AdmissionQueue::new(ConcurrencyClass::Other, production_limit),
        }
    }

    /// Create queues from a [`ConcurrencyConfig`].
    #[must_use]
    pub fn from_config(cfg: &ConcurrencyConfig) -> Self {
        Self::new(cfg.manual_limit, cfg.production_limit)
    }

    /// No caps on either class.
    #[must_use]
    pub fn unlimited() -> Self {
        Self::new(-1, -1)
    }

    /// Attach one event sink to both queues.
    #[must_use]
    pub fn with_event_sink(self, sink: Arc<dyn EventSink>) -> Self {
        Self {
            manual: self.manual.with_event_sink(Arc::clone(&sink)),
            other: self.other.with_event_sink(sink),
        }
    }

    /// Queue for `class`.
    #[must_use]
    pub const fn queue(&self, class: ConcurrencyClass) -> &AdmissionQueue {
        match class {
            ConcurrencyClass::Manual => &self.manual,
            ConcurrencyClass::Other => &self.other,
        }
    }

    /// Queue whose cap applies to executions started in `mode`.
    #[must_use]
    pub const fn queue_for(&self, mode: ExecutionMode) -> &AdmissionQueue {
        self.queue(mode.admission_class())
    }

    /// Occupancy of both queues, manual first.
    pub fn stats(&self) -> [QueueStats; 2] {
        [self.manual.stats(), self.other.stats()]
    }
}

impl Default for ConcurrencyControl {
    fn default() -> Self {
        Self::unlimited()
    }
}
