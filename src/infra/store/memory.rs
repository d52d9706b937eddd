//! In-memory persistence store for development and testing.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::core::{
    ExecutionId, ExecutionMode, ExecutionPatch, ExecutionSpec, ExecutionStatus,
    NewExecutionRecord, PersistenceStore, StoreError,
};
use crate::util::clock::now_ms;

/// Execution record as held by [`InMemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredExecution {
    /// Generated identifier.
    pub id: ExecutionId,
    /// Workflow identifier.
    pub workflow_id: String,
    /// Trigger mode.
    pub mode: ExecutionMode,
    /// Persisted status.
    pub status: ExecutionStatus,
    /// Prior execution this one retries, if any.
    pub retry_of: Option<ExecutionId>,
    /// Opaque run data.
    pub data: serde_json::Value,
    /// Creation timestamp milliseconds.
    pub created_at_ms: u128,
    /// Last update timestamp milliseconds.
    pub updated_at_ms: u128,
}

/// Simple in-memory store keyed by UUID v4 execution ids.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<HashMap<ExecutionId, StoredExecution>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under a known id, as if an earlier process had written it.
    pub fn seed(&self, id: impl Into<ExecutionId>, spec: &ExecutionSpec, status: ExecutionStatus) {
        let id = id.into();
        let now = now_ms();
        self.records.lock().insert(
            id.clone(),
            StoredExecution {
                id,
                workflow_id: spec.workflow_id.clone(),
                mode: spec.mode,
                status,
                retry_of: spec.retry_of.clone(),
                data: spec.data.clone(),
                created_at_ms: now,
                updated_at_ms: now,
            },
        );
    }

    /// Fetch a copy of the record for `id`.
    pub fn get(&self, id: &str) -> Option<StoredExecution> {
        self.records.lock().get(id).cloned()
    }

    /// Persisted status for `id`.
    pub fn status_of(&self, id: &str) -> Option<ExecutionStatus> {
        self.records.lock().get(id).map(|r| r.status)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    fn with_record<F>(&self, id: &str, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut StoredExecution),
    {
        let mut records = self.records.lock();
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        f(record);
        record.updated_at_ms = now_ms();
        Ok(())
    }
}

#[async_trait]
impl PersistenceStore for InMemoryStore {
    async fn create_new_execution(
        &self,
        record: NewExecutionRecord,
    ) -> Result<Option<ExecutionId>, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.records.lock().insert(
            id.clone(),
            StoredExecution {
                id: id.clone(),
                workflow_id: record.workflow_id,
                mode: record.mode,
                status: record.status,
                retry_of: record.retry_of,
                data: record.data,
                created_at_ms: record.created_at_ms,
                updated_at_ms: record.created_at_ms,
            },
        );
        tracing::debug!(execution_id = %id, "execution record created");
        Ok(Some(id))
    }

    async fn update_existing_execution(
        &self,
        id: &str,
        patch: ExecutionPatch,
    ) -> Result<(), StoreError> {
        self.with_record(id, |record| {
            if let Some(status) = patch.status {
                record.status = status;
            }
            if let Some(data) = patch.data {
                record.data = data;
            }
        })
    }

    async fn update_status(&self, id: &str, status: ExecutionStatus) -> Result<(), StoreError> {
        self.with_record(id, |record| record.status = status)
    }
}
