//! Error types for admission and registry operations.

use thiserror::Error;

use crate::core::execution::{ConcurrencyClass, ExecutionId, ExecutionStatus};

/// Errors produced by an admission queue.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdmissionError {
    /// The id is already pending or admitted in this class.
    #[error("execution {id} is already queued or admitted in class {class}")]
    Duplicate {
        /// Offending execution id.
        id: ExecutionId,
        /// Class of the queue that rejected it.
        class: ConcurrencyClass,
    },
}

/// Errors surfaced by a persistence store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store holds no record for this id.
    #[error("execution record not found: {0}")]
    NotFound(ExecutionId),
    /// Backend-specific failure with context.
    #[error("store backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Errors produced by the execution registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The id is not tracked (operation before admission completed, or after removal).
    #[error("execution not found: {0}")]
    NotFound(ExecutionId),
    /// The id is already tracked or waiting for admission.
    #[error("execution already tracked: {0}")]
    AlreadyTracked(ExecutionId),
    /// The store did not yield an id for a brand-new execution.
    #[error("persistence store did not return an execution id")]
    IdAllocation,
    /// The execution was stopped while it was still waiting for admission.
    #[error("execution {0} was canceled before admission")]
    CanceledBeforeAdmission(ExecutionId),
    /// Requested status change would move the lifecycle backwards.
    #[error("execution {id}: invalid status transition {from} -> {to}")]
    InvalidTransition {
        /// Execution id.
        id: ExecutionId,
        /// Current status.
        from: ExecutionStatus,
        /// Requested status.
        to: ExecutionStatus,
    },
    /// A response future is already attached to this execution.
    #[error("execution {0} already has a response future attached")]
    ResponseAlreadyAttached(ExecutionId),
    /// The registry is draining and accepts no new executions.
    #[error("registry is shutting down")]
    ShuttingDown,
    /// Configuration rejected at build time.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Admission queue rejected the id.
    #[error(transparent)]
    Admission(#[from] AdmissionError),
    /// Persistence store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
