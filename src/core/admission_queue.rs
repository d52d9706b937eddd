//! Capacity-bounded, fair admission queue for one concurrency class.
//!
//! Each queue tracks the ids currently holding a slot and a FIFO list of
//! waiters. A released slot is handed directly to the earliest live waiter,
//! so the occupied count never dips between a release and the next admission.
//!
//! All state sits behind one `parking_lot::Mutex` that is only taken for short
//! synchronous sections and never held across an `.await`.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::core::error::AdmissionError;
use crate::core::events::{AdmissionAction, AdmissionEvent, EventSink};
use crate::core::execution::{ConcurrencyClass, ExecutionId};

/// Outcome of waiting for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The id now holds a slot.
    Admitted,
    /// The pending request was withdrawn before a slot was granted.
    Canceled,
}

/// Snapshot of a queue's occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    /// Class served by the queue.
    pub class: ConcurrencyClass,
    /// Slot limit, `None` when unlimited.
    pub capacity: Option<usize>,
    /// Ids currently holding a slot.
    pub occupied: usize,
    /// Ids waiting for a slot.
    pub pending: usize,
}

struct Waiter {
    id: ExecutionId,
    tx: oneshot::Sender<Admission>,
}

#[derive(Default)]
struct QueueState {
    admitted: HashSet<ExecutionId>,
    waiters: VecDeque<Waiter>,
}

impl QueueState {
    fn is_pending(&self, id: &str) -> bool {
        self.waiters.iter().any(|w| w.id == id)
    }

    fn take_waiter(&mut self, id: &str) -> Option<Waiter> {
        let pos = self.waiters.iter().position(|w| w.id == id)?;
        self.waiters.remove(pos)
    }
}

/// FIFO admission queue bounding concurrently admitted ids of one class.
pub struct AdmissionQueue {
    class: ConcurrencyClass,
    capacity: Option<usize>,
    state: Mutex<QueueState>,
    events: Option<Arc<dyn EventSink>>,
}

impl AdmissionQueue {
    /// Create a queue for `class`. A `capacity` of zero or less means unlimited.
    #[must_use]
    pub fn new(class: ConcurrencyClass, capacity: i64) -> Self {
        Self {
            class,
            capacity: usize::try_from(capacity).ok().filter(|c| *c > 0),
            state: Mutex::new(QueueState::default()),
            events: None,
        }
    }

    /// Attach an admission event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = Some(sink);
        self
    }

    /// Class served by this queue.
    #[must_use]
    pub const fn class(&self) -> ConcurrencyClass {
        self.class
    }

    /// Slot limit, `None` when unlimited.
    #[must_use]
    pub const fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Number of ids currently holding a slot.
    pub fn occupied(&self) -> usize {
        self.state.lock().admitted.len()
    }

    /// Number of ids waiting for a slot.
    pub fn pending_len(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Whether `id` is waiting for a slot.
    pub fn is_pending(&self, id: &str) -> bool {
        self.state.lock().is_pending(id)
    }

    /// Whether `id` holds a slot.
    pub fn is_admitted(&self, id: &str) -> bool {
        self.state.lock().admitted.contains(id)
    }

    /// Pending ids in admission order.
    pub fn pending_ids(&self) -> Vec<ExecutionId> {
        self.state.lock().waiters.iter().map(|w| w.id.clone()).collect()
    }

    /// Occupancy snapshot.
    pub fn stats(&self) -> QueueStats {
        let state = self.state.lock();
        QueueStats {
            class: self.class,
            capacity: self.capacity,
            occupied: state.admitted.len(),
            pending: state.waiters.len(),
        }
    }

    /// Wait for a slot for `id`.
    ///
    /// Resolves without suspending when the class is unlimited or a slot is
    /// free. Otherwise the id joins the back of the wait list until a slot is
    /// handed to it ([`Admission::Admitted`]) or the request is withdrawn with
    /// [`AdmissionQueue::remove`] ([`Admission::Canceled`]).
    ///
    /// Dropping the returned future before it completes withdraws the request,
    /// or releases the slot if one was already handed over.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::Duplicate`] if `id` is already pending or admitted.
    pub async fn enqueue(&self, id: &str) -> Result<Admission, AdmissionError> {
        let ticket = self.register(id)?;
        Ok(ticket.wait().await)
    }

    /// Claim a slot for `id` or join the wait list, without suspending.
    ///
    /// The returned [`Ticket`] reports the outcome through [`Ticket::wait`].
    /// On return `id` is already admitted or pending, so a
    /// [`remove`](Self::remove) issued from then on reaches it.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::Duplicate`] if `id` is already pending or admitted.
    pub fn register(&self, id: &str) -> Result<Ticket<'_>, AdmissionError> {
        let mut state = self.state.lock();
        if state.admitted.contains(id) || state.is_pending(id) {
            return Err(AdmissionError::Duplicate {
                id: id.to_owned(),
                class: self.class,
            });
        }

        if self.has_free_slot(&state) {
            state.admitted.insert(id.to_owned());
            let (occupied, pending) = (state.admitted.len(), state.waiters.len());
            drop(state);
            tracing::debug!(execution_id = id, class = %self.class, occupied, "admitted immediately");
            self.emit(id, AdmissionAction::Admitted, occupied, pending);
            return Ok(Ticket::new(self, id, None));
        }

        let (tx, rx) = oneshot::channel();
        state.waiters.push_back(Waiter {
            id: id.to_owned(),
            tx,
        });
        let (occupied, pending) = (state.admitted.len(), state.waiters.len());
        drop(state);
        tracing::debug!(execution_id = id, class = %self.class, pending, "class saturated, execution throttled");
        self.emit(id, AdmissionAction::Throttled, occupied, pending);
        Ok(Ticket::new(self, id, Some(rx)))
    }

    /// Release the slot held by `id`, handing it to the earliest live waiter.
    ///
    /// Returns `false` (and changes nothing) if `id` holds no slot.
    pub fn dequeue(&self, id: &str) -> bool {
        let mut handed_to = None;
        let (occupied, pending) = {
            let mut state = self.state.lock();
            if !state.admitted.remove(id) {
                return false;
            }
            while let Some(waiter) = state.waiters.pop_front() {
                state.admitted.insert(waiter.id.clone());
                if waiter.tx.send(Admission::Admitted).is_ok() {
                    handed_to = Some(waiter.id);
                    break;
                }
                // caller stopped waiting
                state.admitted.remove(&waiter.id);
            }
            (state.admitted.len(), state.waiters.len())
        };

        self.emit(id, AdmissionAction::Released, occupied, pending);
        if let Some(next) = handed_to {
            tracing::debug!(released = id, execution_id = %next, class = %self.class, "slot handed off");
            self.emit(&next, AdmissionAction::Admitted, occupied, pending);
        }
        true
    }

    /// Withdraw a pending request, resolving its waiter with [`Admission::Canceled`].
    ///
    /// Returns `false` if `id` is not pending; an admitted id is never evicted.
    pub fn remove(&self, id: &str) -> bool {
        let (waiter, occupied, pending) = {
            let mut state = self.state.lock();
            let waiter = state.take_waiter(id);
            (waiter, state.admitted.len(), state.waiters.len())
        };
        let Some(waiter) = waiter else {
            return false;
        };
        let _ = waiter.tx.send(Admission::Canceled);
        tracing::debug!(execution_id = id, class = %self.class, "pending admission canceled");
        self.emit(id, AdmissionAction::Canceled, occupied, pending);
        true
    }

    fn has_free_slot(&self, state: &QueueState) -> bool {
        match self.capacity {
            Some(cap) => state.admitted.len() < cap,
            None => true,
        }
    }

    /// Cleanup for an `enqueue` future dropped before it observed its outcome.
    fn abandon(&self, id: &str) {
        let handed_off = {
            let mut state = self.state.lock();
            if state.take_waiter(id).is_some() {
                false
            } else {
                state.admitted.contains(id)
            }
        };
        if handed_off {
            self.dequeue(id);
        }
    }

    fn emit(&self, id: &str, action: AdmissionAction, occupied: usize, pending: usize) {
        if let Some(sink) = &self.events {
            sink.record(AdmissionEvent::new(id, self.class, action, occupied, pending));
        }
    }
}

/// Registration produced by [`AdmissionQueue::register`].
///
/// Dropping a ticket before [`wait`](Self::wait) completes withdraws the
/// request, or releases the slot if one was granted but never observed.
#[must_use = "dropping a ticket withdraws the admission request"]
pub struct Ticket<'a> {
    queue: &'a AdmissionQueue,
    id: ExecutionId,
    rx: Option<oneshot::Receiver<Admission>>,
    armed: bool,
}

impl<'a> Ticket<'a> {
    fn new(queue: &'a AdmissionQueue, id: &str, rx: Option<oneshot::Receiver<Admission>>) -> Self {
        Self {
            queue,
            id: id.to_owned(),
            rx,
            armed: true,
        }
    }

    /// Id this ticket was issued for.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the slot was granted at registration.
    #[must_use]
    pub const fn is_admitted(&self) -> bool {
        self.rx.is_none()
    }

    /// Wait until the slot is handed over or the request is withdrawn.
    pub async fn wait(mut self) -> Admission {
        let admission = match self.rx.take() {
            // A dropped sender means the queue itself went away.
            Some(rx) => rx.await.unwrap_or(Admission::Canceled),
            None => Admission::Admitted,
        };
        self.armed = false;
        admission
    }
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.queue.abandon(&self.id);
        }
    }
}
