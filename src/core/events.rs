//! Admission event sinks.
//!
//! Admission queues report throttling and slot traffic to an optional sink:
//! an in-memory ring buffer for tests and dev, or a `tracing` forwarder.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::core::execution::{ConcurrencyClass, ExecutionId};
use crate::util::clock::now_ms;

/// What happened to an execution at the admission queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionAction {
    /// Granted a slot (immediately or by hand-off).
    Admitted,
    /// Class saturated; the execution is waiting.
    Throttled,
    /// Slot released by a finished execution.
    Released,
    /// Pending request withdrawn before admission.
    Canceled,
}

/// Admission event structure.
#[derive(Debug, Clone)]
pub struct AdmissionEvent {
    /// Related execution identifier.
    pub execution_id: ExecutionId,
    /// Class of the queue that emitted the event.
    pub class: ConcurrencyClass,
    /// Action taken.
    pub action: AdmissionAction,
    /// Occupied slots right after the action.
    pub occupied: usize,
    /// Pending waiters right after the action.
    pub pending: usize,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

impl AdmissionEvent {
    /// Build an event stamped with the current time.
    pub fn new(
        execution_id: impl Into<ExecutionId>,
        class: ConcurrencyClass,
        action: AdmissionAction,
        occupied: usize,
        pending: usize,
    ) -> Self {
        Self {
            execution_id: execution_id.into(),
            class,
            action,
            occupied,
            pending,
            created_at_ms: now_ms(),
        }
    }
}

/// Admission event sink abstraction.
pub trait EventSink: Send + Sync {
    /// Record an admission event.
    ///
    /// Called synchronously, possibly while the registry lock is held; must
    /// not call back into the registry.
    fn record(&self, event: AdmissionEvent);
}

/// In-memory event sink with a bounded buffer, for testing and dev.
pub struct InMemoryEventSink {
    events: Mutex<VecDeque<AdmissionEvent>>,
    max_events: usize,
}

impl InMemoryEventSink {
    /// Create a new in-memory sink keeping at most `max_events`.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events.min(1024))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events, oldest first.
    pub fn events(&self) -> Vec<AdmissionEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Stored events matching `action`.
    pub fn events_with(&self, action: AdmissionAction) -> Vec<AdmissionEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect()
    }
}

impl EventSink for InMemoryEventSink {
    fn record(&self, event: AdmissionEvent) {
        if self.max_events == 0 {
            return;
        }
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Sink forwarding admission events to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&self, event: AdmissionEvent) {
        tracing::debug!(
            execution_id = %event.execution_id,
            class = %event.class,
            action = ?event.action,
            occupied = event.occupied,
            pending = event.pending,
            "admission event"
        );
    }
}
