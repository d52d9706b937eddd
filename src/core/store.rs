//! Persistence store abstraction for execution records.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::error::StoreError;
use crate::core::execution::{ExecutionId, ExecutionMode, ExecutionSpec, ExecutionStatus};

/// Record written for a brand-new execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExecutionRecord {
    /// Workflow the execution belongs to.
    pub workflow_id: String,
    /// Trigger mode.
    pub mode: ExecutionMode,
    /// Initial status (always `New` when written by the registry).
    pub status: ExecutionStatus,
    /// Prior execution this one retries, if any.
    pub retry_of: Option<ExecutionId>,
    /// Opaque run data.
    pub data: serde_json::Value,
    /// Creation timestamp in milliseconds since epoch.
    pub created_at_ms: u128,
}

impl NewExecutionRecord {
    /// Build a `New` record from a spec.
    #[must_use]
    pub fn from_spec(spec: &ExecutionSpec) -> Self {
        Self {
            workflow_id: spec.workflow_id.clone(),
            mode: spec.mode,
            status: ExecutionStatus::New,
            retry_of: spec.retry_of.clone(),
            data: spec.data.clone(),
            created_at_ms: crate::util::clock::now_ms(),
        }
    }
}

/// Partial update applied to an existing record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPatch {
    /// New status, if changing.
    pub status: Option<ExecutionStatus>,
    /// Replacement run data, if changing.
    pub data: Option<serde_json::Value>,
}

impl ExecutionPatch {
    /// Patch that only changes the status.
    #[must_use]
    pub const fn status(status: ExecutionStatus) -> Self {
        Self {
            status: Some(status),
            data: None,
        }
    }
}

/// Durable storage for execution records.
///
/// The registry only needs these three operations to succeed or fail; the
/// storage format is up to the implementation.
#[async_trait]
pub trait PersistenceStore: Send + Sync + 'static {
    /// Persist a new record and return its generated id.
    ///
    /// `Ok(None)` means the backend accepted the write but produced no id.
    async fn create_new_execution(
        &self,
        record: NewExecutionRecord,
    ) -> Result<Option<ExecutionId>, StoreError>;

    /// Apply `patch` to an existing record.
    async fn update_existing_execution(
        &self,
        id: &str,
        patch: ExecutionPatch,
    ) -> Result<(), StoreError>;

    /// Set the persisted status of a record.
    async fn update_status(&self, id: &str, status: ExecutionStatus) -> Result<(), StoreError>;
}
