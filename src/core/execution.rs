//! Execution data model: identifiers, modes, admission classes and statuses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique execution identifier, as issued by the persistence store.
pub type ExecutionId = String;

/// Payload delivered to a caller waiting on an execution's response
/// (for example the body of a webhook reply).
pub type ResponsePayload = serde_json::Value;

/// What triggered an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Started from the command line.
    Cli,
    /// Error workflow triggered by another execution's failure.
    Error,
    /// Sub-workflow started from the engine itself.
    Integrated,
    /// Internal maintenance execution.
    Internal,
    /// Started interactively by a user from the editor.
    Manual,
    /// Retry of a previous execution.
    Retry,
    /// Started by a polling or event trigger.
    Trigger,
    /// Started by an incoming webhook call.
    Webhook,
    /// Evaluation/test run.
    Evaluation,
}

impl ExecutionMode {
    /// Admission class whose concurrency cap applies to this mode.
    #[must_use]
    pub const fn admission_class(self) -> ConcurrencyClass {
        match self {
            Self::Manual => ConcurrencyClass::Manual,
            _ => ConcurrencyClass::Other,
        }
    }
}

/// Two-way partition used to apply independent concurrency caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyClass {
    /// Interactive executions started from the editor.
    Manual,
    /// Every other trigger (webhooks, schedules, retries, ...).
    Other,
}

impl ConcurrencyClass {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ConcurrencyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime status of a tracked execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Admitted (or being admitted) but the engine has not started it.
    New,
    /// The engine is running it.
    Running,
    /// Canceled before start, or the engine honored a cancel request.
    Canceled,
    /// The engine finished it.
    Finished,
}

impl ExecutionStatus {
    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Canceled | Self::Finished)
    }

    /// Whether moving from `self` to `next` respects the lifecycle.
    ///
    /// Setting the current status again is accepted as a no-op.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Self::New, Self::Running | Self::Canceled)
                | (Self::Running, Self::Finished | Self::Canceled)
        )
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Running => "running",
            Self::Canceled => "canceled",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied description of an execution to admit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSpec {
    /// Workflow this execution belongs to.
    pub workflow_id: String,
    /// Trigger mode; selects the admission class.
    pub mode: ExecutionMode,
    /// Prior execution this one retries, if any.
    pub retry_of: Option<ExecutionId>,
    /// Opaque run data handed to the store.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ExecutionSpec {
    /// Create a spec with no lineage and empty run data.
    pub fn new(workflow_id: impl Into<String>, mode: ExecutionMode) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            mode,
            retry_of: None,
            data: serde_json::Value::Null,
        }
    }

    /// Mark this execution as a retry of `previous`.
    #[must_use]
    pub fn with_retry_of(mut self, previous: impl Into<ExecutionId>) -> Self {
        self.retry_of = Some(previous.into());
        self
    }

    /// Attach run data.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

/// Final outcome published to completion waiters when an execution leaves the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Status the execution ended in.
    pub status: ExecutionStatus,
    /// Result data produced by the engine.
    #[serde(default)]
    pub data: serde_json::Value,
    /// Error message if the run failed.
    pub error: Option<String>,
    /// When the execution stopped (ms since epoch).
    pub stopped_at_ms: u128,
}

impl ExecutionResult {
    /// Successful completion carrying `data`.
    #[must_use]
    pub fn finished(data: serde_json::Value) -> Self {
        Self {
            status: ExecutionStatus::Finished,
            data,
            error: None,
            stopped_at_ms: crate::util::clock::now_ms(),
        }
    }

    /// Outcome of an execution canceled before the engine started it.
    #[must_use]
    pub fn canceled() -> Self {
        Self {
            status: ExecutionStatus::Canceled,
            data: serde_json::Value::Null,
            error: None,
            stopped_at_ms: crate::util::clock::now_ms(),
        }
    }
}

/// Point-in-time view of a tracked execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    /// Execution identifier.
    pub id: ExecutionId,
    /// Workflow identifier.
    pub workflow_id: String,
    /// Trigger mode.
    pub mode: ExecutionMode,
    /// Current status.
    pub status: ExecutionStatus,
    /// Admission timestamp (ms since epoch).
    pub started_at_ms: u128,
    /// Prior execution this one retries, if any.
    pub retry_of: Option<ExecutionId>,
}
