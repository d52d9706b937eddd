//! Registry of admitted executions.
//!
//! The registry is the single owner of every admitted execution's tracking
//! entry. An entry is created only after the execution's class queue grants a
//! slot, and destroyed exactly once, by [`ExecutionRegistry::remove`], which
//! also releases the slot and publishes the final result to every waiter.
//!
//! ## Lifecycle
//! ```text
//! add ──► store.create / store.update ──► AdmissionQueue::enqueue ──► entry(New|Running)
//!                                              │ (waits while saturated)
//!                                              ▼
//! attach_run_handle ──► engine runs ──► remove(id, result) ──► slot released
//!                                                           └─► waiters resolved
//! ```
//!
//! ## Rules
//! - The state map is behind a `parking_lot::Mutex`; it is never held across
//!   an `.await` and run handles are canceled outside of it.
//! - Lock order is registry state, then queue state. An execution is
//!   registered with its queue in the same critical section that marks it
//!   pending, so a stop never observes a pending id missing from the queue.
//! - Cancellation is cooperative: a running execution is only asked to stop,
//!   and the registry waits for the engine to call `remove`.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::core::admission_queue::{Admission, QueueStats};
use crate::core::concurrency::ConcurrencyControl;
use crate::core::error::{RegistryError, RegistryResult};
use crate::core::execution::{
    ExecutionId, ExecutionMode, ExecutionResult, ExecutionSpec, ExecutionStatus,
    ExecutionSummary, ResponsePayload,
};
use crate::core::run_handle::RunHandle;
use crate::core::store::{ExecutionPatch, NewExecutionRecord, PersistenceStore};
use crate::util::clock::now_ms;

/// How [`ExecutionRegistry::shutdown`] polls while draining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainPolicy {
    poll_interval: Duration,
    report_every: u32,
}

impl DrainPolicy {
    /// Poll every `poll_interval`, logging progress every `report_every` polls.
    ///
    /// A `report_every` of zero is treated as one.
    #[must_use]
    pub fn new(poll_interval: Duration, report_every: u32) -> Self {
        Self {
            poll_interval,
            report_every: report_every.max(1),
        }
    }

    /// Interval between drain checks.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Number of polls between progress messages.
    #[must_use]
    pub const fn report_every(&self) -> u32 {
        self.report_every
    }
}

impl Default for DrainPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), 4)
    }
}

/// Registry-wide counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    /// Admitted executions currently tracked.
    pub tracked: usize,
    /// Executions waiting for admission.
    pub pending: usize,
    /// Manual class queue.
    pub manual: QueueStats,
    /// Other class queue.
    pub other: QueueStats,
}

/// Resolves with the final result an execution was removed with.
///
/// Yields `None` when the execution was removed without a result or the
/// registry went away.
#[must_use = "completion handles do nothing unless awaited"]
pub struct CompletionHandle {
    rx: oneshot::Receiver<Option<ExecutionResult>>,
}

impl Future for CompletionHandle {
    type Output = Option<ExecutionResult>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|r| r.ok().flatten())
    }
}

/// Resolves with the response payload delivered for an execution.
///
/// Yields `None` if the execution left the registry without a response.
#[must_use = "response handles do nothing unless awaited"]
pub struct ResponseHandle {
    rx: oneshot::Receiver<ResponsePayload>,
}

impl Future for ResponseHandle {
    type Output = Option<ResponsePayload>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(Result::ok)
    }
}

struct ExecutionEntry {
    workflow_id: String,
    mode: ExecutionMode,
    retry_of: Option<ExecutionId>,
    status: ExecutionStatus,
    started_at_ms: u128,
    run_handle: Option<Arc<dyn RunHandle>>,
    response: Option<oneshot::Sender<ResponsePayload>>,
    response_attached: bool,
    completion_waiters: Vec<oneshot::Sender<Option<ExecutionResult>>>,
    cancel_requested: bool,
}

impl ExecutionEntry {
    fn new(spec: ExecutionSpec, status: ExecutionStatus) -> Self {
        Self {
            workflow_id: spec.workflow_id,
            mode: spec.mode,
            retry_of: spec.retry_of,
            status,
            started_at_ms: now_ms(),
            run_handle: None,
            response: None,
            response_attached: false,
            completion_waiters: Vec::new(),
            cancel_requested: false,
        }
    }

    fn add_waiter(&mut self) -> CompletionHandle {
        let (tx, rx) = oneshot::channel();
        self.completion_waiters.push(tx);
        CompletionHandle { rx }
    }

    /// Marks the entry as canceled-on-request; returns the handle to cancel the first time.
    fn request_cancel(&mut self) -> Option<Arc<dyn RunHandle>> {
        if self.cancel_requested {
            return None;
        }
        self.cancel_requested = true;
        self.run_handle.clone()
    }

    fn summary(&self, id: &str) -> ExecutionSummary {
        ExecutionSummary {
            id: id.to_owned(),
            workflow_id: self.workflow_id.clone(),
            mode: self.mode,
            status: self.status,
            started_at_ms: self.started_at_ms,
            retry_of: self.retry_of.clone(),
        }
    }
}

struct PendingExecution {
    mode: ExecutionMode,
    cancel_requested: bool,
}

#[derive(Default)]
struct RegistryState {
    entries: HashMap<ExecutionId, ExecutionEntry>,
    pending: HashMap<ExecutionId, PendingExecution>,
}

/// What `stop_execution` decided under the lock.
enum StopTarget {
    Pending(ExecutionMode),
    Local,
    Cooperative {
        cancel: Option<Arc<dyn RunHandle>>,
        completion: CompletionHandle,
    },
}

/// Removes a pending marker if `enqueue` is dropped while waiting for admission.
struct PendingRegistration<'a> {
    state: &'a Mutex<RegistryState>,
    id: &'a str,
    armed: bool,
}

impl Drop for PendingRegistration<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.lock().pending.remove(self.id);
        }
    }
}

/// Admission-controlled registry of active executions.
///
/// Construct one per process and share it (usually behind an `Arc`); every
/// mutation goes through its methods.
pub struct ExecutionRegistry<S> {
    store: S,
    concurrency: ConcurrencyControl,
    state: Mutex<RegistryState>,
    shutting_down: AtomicBool,
    drain: DrainPolicy,
}

impl<S> ExecutionRegistry<S>
where
    S: PersistenceStore,
{
    /// Create a registry over `store` with the given concurrency caps.
    pub fn new(store: S, concurrency: ConcurrencyControl) -> Self {
        Self {
            store,
            concurrency,
            state: Mutex::new(RegistryState::default()),
            shutting_down: AtomicBool::new(false),
            drain: DrainPolicy::default(),
        }
    }

    /// Override the shutdown drain policy.
    #[must_use]
    pub fn with_drain_policy(mut self, drain: DrainPolicy) -> Self {
        self.drain = drain;
        self
    }

    /// Persistence store backing this registry.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Per-class admission queues.
    pub const fn concurrency(&self) -> &ConcurrencyControl {
        &self.concurrency
    }

    /// Whether [`shutdown`](Self::shutdown) has begun.
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Register an execution and wait until its class admits it.
    ///
    /// Without `existing_id` a new record is created in the store with status
    /// `New`. With one, the execution is resumed: it is admitted with status
    /// `Running`, and the stored record is updated to `Running` once the slot
    /// is granted.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::ShuttingDown`] once shutdown has begun
    /// - [`RegistryError::IdAllocation`] if the store returns no id
    /// - [`RegistryError::CanceledBeforeAdmission`] if stopped while waiting
    /// - [`RegistryError::AlreadyTracked`] for an id already tracked or waiting
    /// - [`RegistryError::Store`] if the store fails
    pub async fn add(
        &self,
        spec: ExecutionSpec,
        existing_id: Option<ExecutionId>,
    ) -> RegistryResult<ExecutionId> {
        if self.is_shutting_down() {
            return Err(RegistryError::ShuttingDown);
        }

        let Some(id) = existing_id else {
            let record = NewExecutionRecord::from_spec(&spec);
            let id = self
                .store
                .create_new_execution(record)
                .await?
                .ok_or(RegistryError::IdAllocation)?;
            debug!(execution_id = %id, mode = ?spec.mode, "new execution persisted");
            self.enqueue(id.clone(), spec, ExecutionStatus::New).await?;
            return Ok(id);
        };

        self.enqueue(id.clone(), spec, ExecutionStatus::Running).await?;
        if let Err(e) = self
            .store
            .update_existing_execution(&id, ExecutionPatch::status(ExecutionStatus::Running))
            .await
        {
            warn!(execution_id = %id, error = %e, "failed to mark resumed execution running");
            self.remove(&id, None);
            return Err(e.into());
        }
        Ok(id)
    }

    /// Wait for admission of `id` and start tracking it with `status`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::AlreadyTracked`] if `id` is tracked or waiting
    /// - [`RegistryError::CanceledBeforeAdmission`] if stopped while waiting
    /// - [`RegistryError::Admission`] if the class queue rejects the id
    pub async fn enqueue(
        &self,
        id: ExecutionId,
        spec: ExecutionSpec,
        status: ExecutionStatus,
    ) -> RegistryResult<()> {
        let queue = self.concurrency.queue_for(spec.mode);
        let ticket = {
            let mut state = self.state.lock();
            if state.entries.contains_key(&id) || state.pending.contains_key(&id) {
                return Err(RegistryError::AlreadyTracked(id));
            }
            // the queue entry must exist before a stop can see the pending marker
            let ticket = queue.register(&id)?;
            state.pending.insert(
                id.clone(),
                PendingExecution {
                    mode: spec.mode,
                    cancel_requested: false,
                },
            );
            ticket
        };

        let mut registration = PendingRegistration {
            state: &self.state,
            id: &id,
            armed: true,
        };
        let admission = ticket.wait().await;
        registration.armed = false;
        drop(registration);

        let mut state = self.state.lock();
        let canceled = state
            .pending
            .remove(&id)
            .is_some_and(|p| p.cancel_requested);
        match admission {
            Admission::Admitted if canceled => {
                drop(state);
                // stop arrived after the hand-off but before we saw it
                queue.dequeue(&id);
                Err(RegistryError::CanceledBeforeAdmission(id))
            }
            Admission::Admitted => {
                debug!(execution_id = %id, class = %queue.class(), status = %status, "execution admitted");
                state.entries.insert(id, ExecutionEntry::new(spec, status));
                Ok(())
            }
            Admission::Canceled => {
                debug!(execution_id = %id, "execution canceled before admission");
                Err(RegistryError::CanceledBeforeAdmission(id))
            }
        }
    }

    /// Bind the engine's run handle to a tracked execution.
    ///
    /// If a stop was already requested the handle is canceled right away.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if `id` is not tracked.
    pub fn attach_run_handle<H>(&self, id: &str, handle: H) -> RegistryResult<()>
    where
        H: RunHandle + 'static,
    {
        let handle: Arc<dyn RunHandle> = Arc::new(handle);
        let cancel_now = {
            let mut state = self.state.lock();
            let entry = state
                .entries
                .get_mut(id)
                .ok_or_else(|| RegistryError::NotFound(id.to_owned()))?;
            entry.run_handle = Some(Arc::clone(&handle));
            entry.cancel_requested
        };
        if cancel_now {
            debug!(execution_id = id, "run handle attached after stop request, canceling");
            handle.cancel();
        }
        Ok(())
    }

    /// Attach the single response future of a tracked execution.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if `id` is not tracked
    /// - [`RegistryError::ResponseAlreadyAttached`] on a second attach
    pub fn attach_response_future(&self, id: &str) -> RegistryResult<ResponseHandle> {
        let mut state = self.state.lock();
        let entry = state
            .entries
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_owned()))?;
        if entry.response_attached {
            return Err(RegistryError::ResponseAlreadyAttached(id.to_owned()));
        }
        let (tx, rx) = oneshot::channel();
        entry.response = Some(tx);
        entry.response_attached = true;
        Ok(ResponseHandle { rx })
    }

    /// Deliver the response payload, if anyone is still waiting for it.
    ///
    /// Unknown ids, missing or already-resolved response futures are ignored.
    pub fn resolve_response_future(&self, id: &str, payload: ResponsePayload) {
        let sender = self
            .state
            .lock()
            .entries
            .get_mut(id)
            .and_then(|e| e.response.take());
        match sender {
            Some(tx) => {
                if tx.send(payload).is_err() {
                    debug!(execution_id = id, "response receiver already dropped");
                }
            }
            None => debug!(execution_id = id, "no response future to resolve"),
        }
    }

    /// Stop tracking `id`: release its slot and resolve every completion
    /// waiter with `final_result`. No-op if `id` is not tracked.
    pub fn remove(&self, id: &str, final_result: Option<ExecutionResult>) {
        let Some(entry) = self.state.lock().entries.remove(id) else {
            debug!(execution_id = id, "remove on untracked execution ignored");
            return;
        };

        let released = self.concurrency.queue_for(entry.mode).dequeue(id);
        let waiters = entry.completion_waiters.len();
        for waiter in entry.completion_waiters {
            let _ = waiter.send(final_result.clone());
        }
        debug!(execution_id = id, waiters, released, "execution removed");
    }

    /// Register a new completion waiter for a tracked execution.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if `id` is not tracked.
    pub fn get_completion_future(&self, id: &str) -> RegistryResult<CompletionHandle> {
        let mut state = self.state.lock();
        let entry = state
            .entries
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_owned()))?;
        Ok(entry.add_waiter())
    }

    /// Stop an execution.
    ///
    /// - Unknown id: `Ok(None)`.
    /// - Still waiting for admission, or admitted with status `New` and no run
    ///   handle yet: the stored status becomes `Canceled`, the pending
    ///   admission is withdrawn (or the slot released) and this returns
    ///   immediately with `None`.
    /// - Otherwise the run handle is asked to cancel (once) and this waits
    ///   until the engine calls [`remove`](Self::remove), returning its result.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] if persisting the canceled status fails;
    /// the admission is withdrawn regardless.
    pub async fn stop_execution(&self, id: &str) -> RegistryResult<Option<ExecutionResult>> {
        let target = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            if let Some(pending) = state.pending.get_mut(id) {
                pending.cancel_requested = true;
                StopTarget::Pending(pending.mode)
            } else if let Some(entry) = state.entries.get_mut(id) {
                if entry.status == ExecutionStatus::New && entry.run_handle.is_none() {
                    entry.status = ExecutionStatus::Canceled;
                    entry.cancel_requested = true;
                    StopTarget::Local
                } else {
                    StopTarget::Cooperative {
                        cancel: entry.request_cancel(),
                        completion: entry.add_waiter(),
                    }
                }
            } else {
                debug!(execution_id = id, "stop on untracked execution ignored");
                return Ok(None);
            }
        };

        match target {
            StopTarget::Pending(mode) => {
                let persisted = self.store.update_status(id, ExecutionStatus::Canceled).await;
                self.concurrency.queue_for(mode).remove(id);
                info!(execution_id = id, "pending execution canceled");
                persisted?;
                Ok(None)
            }
            StopTarget::Local => {
                let persisted = self.store.update_status(id, ExecutionStatus::Canceled).await;
                self.remove(id, Some(ExecutionResult::canceled()));
                info!(execution_id = id, "execution canceled before start");
                persisted?;
                Ok(None)
            }
            StopTarget::Cooperative { cancel, completion } => {
                if let Some(handle) = cancel {
                    info!(execution_id = id, "requesting cancellation of running execution");
                    handle.cancel();
                }
                Ok(completion.await)
            }
        }
    }

    /// Summaries of all tracked executions, oldest admission first.
    pub fn snapshot(&self) -> Vec<ExecutionSummary> {
        let state = self.state.lock();
        let mut list: Vec<ExecutionSummary> = state
            .entries
            .iter()
            .map(|(id, entry)| entry.summary(id))
            .collect();
        drop(state);
        list.sort_by(|a, b| {
            a.started_at_ms
                .cmp(&b.started_at_ms)
                .then_with(|| a.id.cmp(&b.id))
        });
        list
    }

    /// Sorted ids of tracked executions whose status is `Running`.
    pub fn running_ids(&self) -> Vec<ExecutionId> {
        let mut ids: Vec<ExecutionId> = self
            .state
            .lock()
            .entries
            .iter()
            .filter(|(_, e)| e.status == ExecutionStatus::Running)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Current status of a tracked execution.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if `id` is not tracked.
    pub fn get_status(&self, id: &str) -> RegistryResult<ExecutionStatus> {
        self.state
            .lock()
            .entries
            .get(id)
            .map(|e| e.status)
            .ok_or_else(|| RegistryError::NotFound(id.to_owned()))
    }

    /// Move a tracked execution to `status`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if `id` is not tracked
    /// - [`RegistryError::InvalidTransition`] if the move is not allowed
    pub fn set_status(&self, id: &str, status: ExecutionStatus) -> RegistryResult<()> {
        let mut state = self.state.lock();
        let entry = state
            .entries
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_owned()))?;
        if !entry.status.can_transition_to(status) {
            return Err(RegistryError::InvalidTransition {
                id: id.to_owned(),
                from: entry.status,
                to: status,
            });
        }
        entry.status = status;
        Ok(())
    }

    /// Whether `id` is tracked.
    pub fn has(&self, id: &str) -> bool {
        self.state.lock().entries.contains_key(id)
    }

    /// Number of tracked executions.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Whether no execution is tracked.
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Number of executions waiting for admission.
    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Registry and queue counters.
    pub fn stats(&self) -> RegistryStats {
        let (tracked, pending) = {
            let state = self.state.lock();
            (state.entries.len(), state.pending.len())
        };
        let [manual, other] = self.concurrency.stats();
        RegistryStats {
            tracked,
            pending,
            manual,
            other,
        }
    }

    /// Drain the registry.
    ///
    /// New executions are refused from now on. With `cancel_all`, every
    /// tracked or pending execution is stopped concurrently; a failing stop is
    /// logged and does not hold up the others. Then the registry is polled
    /// until nothing is tracked or pending, logging progress periodically.
    /// There is no deadline.
    pub async fn shutdown(&self, cancel_all: bool) {
        self.shutting_down.store(true, Ordering::Release);

        if cancel_all {
            let ids: Vec<ExecutionId> = {
                let state = self.state.lock();
                state
                    .entries
                    .keys()
                    .chain(state.pending.keys())
                    .cloned()
                    .collect()
            };
            info!(count = ids.len(), "stopping all active executions");
            let outcomes = join_all(ids.iter().map(|id| self.stop_execution(id))).await;
            for (id, outcome) in ids.iter().zip(outcomes) {
                if let Err(e) = outcome {
                    warn!(execution_id = %id, error = %e, "failed to stop execution during shutdown");
                }
            }
        }

        // Polling is intentional; the drain does not wait on a notification.
        let mut polls: u32 = 0;
        loop {
            let remaining = {
                let state = self.state.lock();
                state.entries.len() + state.pending.len()
            };
            if remaining == 0 {
                break;
            }
            if polls % self.drain.report_every == 0 {
                info!(remaining, "waiting for {remaining} active executions to finish");
            }
            polls = polls.wrapping_add(1);
            tokio::time::sleep(self.drain.poll_interval).await;
        }
        info!("all active executions drained");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::store::memory::InMemoryStore;

    fn registry() -> ExecutionRegistry<InMemoryStore> {
        ExecutionRegistry::new(InMemoryStore::new(), ConcurrencyControl::unlimited())
    }

    fn spec() -> ExecutionSpec {
        ExecutionSpec::new("wf-1", ExecutionMode::Webhook)
    }

    #[tokio::test]
    async fn test_set_status_follows_lifecycle() {
        let reg = registry();
        let id = reg.add(spec(), None).await.unwrap();
        assert_eq!(reg.get_status(&id).unwrap(), ExecutionStatus::New);

        reg.set_status(&id, ExecutionStatus::Running).unwrap();
        assert_eq!(reg.running_ids(), vec![id.clone()]);

        let err = reg.set_status(&id, ExecutionStatus::New).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidTransition {
                from: ExecutionStatus::Running,
                to: ExecutionStatus::New,
                ..
            }
        ));

        reg.set_status(&id, ExecutionStatus::Finished).unwrap();
        assert!(reg.running_ids().is_empty());
    }

    #[tokio::test]
    async fn test_untracked_accessors_fail_with_not_found() {
        let reg = registry();
        assert!(matches!(reg.get_status("x"), Err(RegistryError::NotFound(id)) if id == "x"));
        assert!(matches!(
            reg.set_status("x", ExecutionStatus::Running),
            Err(RegistryError::NotFound(_))
        ));
        assert!(matches!(reg.get_completion_future("x"), Err(RegistryError::NotFound(_))));
        assert!(matches!(reg.attach_response_future("x"), Err(RegistryError::NotFound(_))));
        assert!(matches!(
            reg.attach_run_handle("x", tokio_util::sync::CancellationToken::new()),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_response_future_resolves_once() {
        let reg = registry();
        let id = reg.add(spec(), None).await.unwrap();

        let response = reg.attach_response_future(&id).unwrap();
        assert!(matches!(
            reg.attach_response_future(&id),
            Err(RegistryError::ResponseAlreadyAttached(_))
        ));

        reg.resolve_response_future(&id, serde_json::json!({ "ok": true }));
        reg.resolve_response_future(&id, serde_json::json!({ "ok": false }));
        assert_eq!(response.await, Some(serde_json::json!({ "ok": true })));
    }

    #[tokio::test]
    async fn test_resolve_response_is_best_effort() {
        let reg = registry();
        reg.resolve_response_future("missing", serde_json::Value::Null);

        let id = reg.add(spec(), None).await.unwrap();
        reg.resolve_response_future(&id, serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_response_dropped_on_remove() {
        let reg = registry();
        let id = reg.add(spec(), None).await.unwrap();
        let response = reg.attach_response_future(&id).unwrap();
        reg.remove(&id, None);
        assert_eq!(response.await, None);
    }

    #[tokio::test]
    async fn test_snapshot_lists_tracked() {
        let reg = registry();
        let a = reg.add(spec(), None).await.unwrap();
        let b = reg
            .add(ExecutionSpec::new("wf-2", ExecutionMode::Manual).with_retry_of("old"), None)
            .await
            .unwrap();

        let snap = reg.snapshot();
        assert_eq!(snap.len(), 2);
        let b_summary = snap.iter().find(|s| s.id == b).unwrap();
        assert_eq!(b_summary.mode, ExecutionMode::Manual);
        assert_eq!(b_summary.retry_of.as_deref(), Some("old"));
        assert!(snap.iter().any(|s| s.id == a && s.workflow_id == "wf-1"));
        assert!(snap.iter().all(|s| s.started_at_ms > 0));
    }

    #[test]
    fn test_drain_policy_clamps_report_every() {
        let policy = DrainPolicy::new(Duration::from_millis(10), 0);
        assert_eq!(policy.report_every(), 1);
        assert_eq!(DrainPolicy::default().poll_interval(), Duration::from_millis(500));
    }
}
