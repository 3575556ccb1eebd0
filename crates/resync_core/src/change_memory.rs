//! Append-only change memory.
//!
//! The change memory records every mutation of a repository as a
//! [`ChangeEvent`] and lets consumers ask for "everything since X".
//!
//! # Usage
//!
//! ```
//! use resync_core::{ChangeKind, ChangeMemory, Resource, SequenceId};
//!
//! let memory = ChangeMemory::new();
//! let resource = Resource::new("http://example.org/1").unwrap();
//! memory.append(ChangeKind::Create, resource.clone());
//! memory.append(ChangeKind::Update, resource.with_size(10));
//!
//! let window = memory.changes_from(SequenceId::new(2));
//! assert_eq!(window.len(), 1);
//! assert_eq!(window.iter().next().unwrap().kind(), ChangeKind::Update);
//! ```

use crate::change::ChangeEvent;
use crate::error::{CoreError, CoreResult};
use crate::resource::Resource;
use crate::types::{ChangeKind, SequenceId};
use chrono::{DateTime, Utc};
use parking_lot::{Condvar, Mutex, RwLock};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use tracing::debug;

/// Callback invoked after every append.
pub type ChangeListener = Box<dyn Fn(&ChangeEvent) + Send + Sync>;

/// An append-only, totally ordered log of change events.
///
/// The change memory:
/// - Assigns strictly increasing sequence ids without gaps
/// - Never removes or rewrites an appended event
/// - Serializes appends; readers see either the state before or after an
///   append, never a partial one
/// - Notifies listeners and subscribers after the append is visible, one
///   event at a time and in sequence order
///
/// Listeners run outside the log's locks and may read from the change
/// memory, but must not append to it: the nested append would wait for
/// the delivery that is running it.
pub struct ChangeMemory {
    /// Events in sequence order.
    events: RwLock<Vec<Arc<ChangeEvent>>>,
    /// Next sequence id, `None` once ids are exhausted. Held for the
    /// duration of an append.
    next_sequence: Mutex<Option<SequenceId>>,
    /// Id of the next event to hand to listeners.
    delivered: Mutex<SequenceId>,
    /// Wakes appenders waiting for their delivery turn.
    delivery: Condvar,
    /// Registered callbacks.
    listeners: RwLock<Vec<ChangeListener>>,
    /// Channel subscribers.
    subscribers: Mutex<Vec<Sender<Arc<ChangeEvent>>>>,
}

impl ChangeMemory {
    /// Creates an empty change memory whose first event gets id 1.
    pub fn new() -> Self {
        Self::starting_at(SequenceId::FIRST)
    }

    /// Creates an empty change memory whose first event gets `first`.
    pub fn starting_at(first: SequenceId) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            next_sequence: Mutex::new(Some(first)),
            delivered: Mutex::new(first),
            delivery: Condvar::new(),
            listeners: RwLock::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Appends a change stamped with the current time.
    ///
    /// Returns the stored event.
    ///
    /// # Panics
    ///
    /// Panics once [`SequenceId::MAX`] has been assigned. Use
    /// [`ChangeMemory::try_append_at`] to handle that case.
    pub fn append(&self, kind: ChangeKind, resource: Resource) -> Arc<ChangeEvent> {
        self.append_at(kind, resource, Utc::now())
    }

    /// Appends a change with an explicit timestamp.
    pub fn append_at(
        &self,
        kind: ChangeKind,
        resource: Resource,
        timestamp: DateTime<Utc>,
    ) -> Arc<ChangeEvent> {
        match self.try_append_at(kind, resource, timestamp) {
            Ok(event) => event,
            Err(err) => panic!("{err}"),
        }
    }

    /// Appends a change, failing instead of panicking when ids run out.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SequenceExhausted`] after [`SequenceId::MAX`]
    /// has been assigned. Nothing is recorded in that case.
    pub fn try_append_at(
        &self,
        kind: ChangeKind,
        resource: Resource,
        timestamp: DateTime<Utc>,
    ) -> CoreResult<Arc<ChangeEvent>> {
        let event = self.record(kind, resource, timestamp)?;
        self.notify(&event);
        Ok(event)
    }

    /// Stores an event without notifying anyone.
    ///
    /// Callers that hold their own lock across the mutation use this and
    /// call `notify` once the lock is released. Every recorded event must
    /// be passed to `notify`, or later deliveries wait forever.
    pub(crate) fn record(
        &self,
        kind: ChangeKind,
        resource: Resource,
        timestamp: DateTime<Utc>,
    ) -> CoreResult<Arc<ChangeEvent>> {
        let mut next = self.next_sequence.lock();
        let id = (*next).ok_or(CoreError::SequenceExhausted {
            last: SequenceId::MAX.as_u64(),
        })?;
        let event = Arc::new(ChangeEvent::from_parts(id, kind, resource, timestamp));
        self.events.write().push(Arc::clone(&event));
        *next = id.checked_next();
        debug!(
            sequence = %event.sequence(),
            kind = %event.kind(),
            uri = event.resource().uri(),
            "recorded change"
        );
        Ok(event)
    }

    /// Delivers an event to listeners and subscribers.
    ///
    /// Waits until every earlier event has been delivered.
    pub(crate) fn notify(&self, event: &Arc<ChangeEvent>) {
        let _turn = self.wait_turn(event.sequence());

        for listener in self.listeners.read().iter() {
            listener(event);
        }

        // Drop subscribers whose receiver is gone
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(Arc::clone(event)).is_ok());
    }

    fn wait_turn(&self, id: SequenceId) -> DeliveryTurn<'_> {
        let mut delivered = self.delivered.lock();
        while *delivered < id {
            self.delivery.wait(&mut delivered);
        }
        DeliveryTurn { memory: self, id }
    }

    /// Registers a callback invoked after every append.
    pub fn on_change<F>(&self, listener: F)
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.listeners.write().push(Box::new(listener));
    }

    /// Subscribes to future events.
    ///
    /// The receiver should be drained regularly to avoid unbounded
    /// memory growth.
    pub fn subscribe(&self) -> Receiver<Arc<ChangeEvent>> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Returns all events with a sequence id at or after `from`, oldest first.
    ///
    /// The window is a snapshot: events appended later are not part of it,
    /// and calling again recomputes it. An id past the latest event yields
    /// an empty window.
    pub fn changes_from(&self, from: SequenceId) -> ChangeWindow {
        let events = self.events.read();
        let start = events.partition_point(|e| e.sequence() < from);
        ChangeWindow {
            from,
            events: events[start..].to_vec(),
        }
    }

    /// Returns every event in the change memory.
    pub fn changes(&self) -> ChangeWindow {
        self.changes_from(SequenceId::new(0))
    }

    /// Returns the event with the given id.
    pub fn get(&self, id: SequenceId) -> Option<Arc<ChangeEvent>> {
        let events = self.events.read();
        events
            .binary_search_by(|e| e.sequence().cmp(&id))
            .ok()
            .map(|i| Arc::clone(&events[i]))
    }

    /// Returns the id of the oldest event, or `None` if the log is empty.
    pub fn first_event_id(&self) -> Option<SequenceId> {
        self.events.read().first().map(|e| e.sequence())
    }

    /// Returns the id of the newest event, or `None` if the log is empty.
    pub fn latest_event_id(&self) -> Option<SequenceId> {
        self.events.read().last().map(|e| e.sequence())
    }

    /// Returns the number of events.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no event has been appended.
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Returns the number of live channel subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl Default for ChangeMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChangeMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeMemory")
            .field("len", &self.len())
            .field("first_event_id", &self.first_event_id())
            .field("latest_event_id", &self.latest_event_id())
            .finish_non_exhaustive()
    }
}

/// Passes the delivery turn to the next event when dropped, even if a
/// listener panicked.
struct DeliveryTurn<'a> {
    memory: &'a ChangeMemory,
    id: SequenceId,
}

impl Drop for DeliveryTurn<'_> {
    fn drop(&mut self) {
        *self.memory.delivered.lock() = self.id.next();
        self.memory.delivery.notify_all();
    }
}

/// A snapshot of consecutive events taken from a change memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeWindow {
    from: SequenceId,
    events: Vec<Arc<ChangeEvent>>,
}

impl ChangeWindow {
    /// Returns the id the window was requested from.
    pub fn start(&self) -> SequenceId {
        self.from
    }

    /// Iterates the events, oldest first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ChangeEvent> + '_ {
        self.events.iter().map(|e| e.as_ref())
    }

    /// Returns the number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the window holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the id of the newest event in the window.
    pub fn last_id(&self) -> Option<SequenceId> {
        self.events.last().map(|e| e.sequence())
    }
}
