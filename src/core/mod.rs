//! Core admission control and execution lifecycle tracking.

pub mod admission_queue;
pub mod concurrency;
pub mod error;
pub mod events;
pub mod execution;
pub mod registry;
pub mod run_handle;
pub mod store;

pub use admission_queue::{Admission, AdmissionQueue, QueueStats, Ticket};
pub use concurrency::ConcurrencyControl;
pub use error::{AdmissionError, RegistryError, RegistryResult, StoreError};
pub use events::{AdmissionAction, AdmissionEvent, EventSink, InMemoryEventSink, TracingEventSink};
pub use execution::{
    ConcurrencyClass, ExecutionId, ExecutionMode, ExecutionResult, ExecutionSpec, ExecutionStatus,
    ExecutionSummary, ResponsePayload,
};
pub use registry::{CompletionHandle, DrainPolicy, ExecutionRegistry, RegistryStats, ResponseHandle};
pub use run_handle::RunHandle;
pub use store::{ExecutionPatch, NewExecutionRecord, PersistenceStore};
