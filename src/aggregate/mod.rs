//! Aggregate Roots
//!
//! An aggregate's state exists only as the result of folding its ordered
//! event history. No field is ever set through any path other than the
//! event-application step, so replaying the same sequence from the zero
//! state always yields identical state.
//!
//! # Lifecycle
//!
//! ```text
//! behavior method → validate → append(event) → when(event) → new state
//!                                    ↓
//!                           uncommitted queue → Repository::save
//! ```
//!
//! Rehydration runs the same `when` step over the historical events read
//! from the stream, so live mutation and replay share one code path.

pub mod profile;
pub mod question;
pub mod tag;

pub use profile::Profile;
pub use question::{Answer, Comment, Question};
pub use tag::Tag;

use uuid::Uuid;

use crate::errors::{DomainResult, PersistenceError, PersistenceResult};
use crate::events::{DomainEvent, EventTypeRegistry};

/// Uncommitted-event queue and version counter for one aggregate instance.
///
/// `version` counts every event applied since the zero state, whether
/// replayed from history or appended live. The pending queue holds only the
/// events appended since construction or rehydration; after a successful
/// save it is empty.
#[derive(Debug, Clone)]
pub struct Journal<E> {
    pending: Vec<E>,
    version: u64,
}

impl<E> Journal<E> {
    /// Create an empty journal at version zero
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            version: 0,
        }
    }

    /// Events applied since the zero state
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Events appended since construction or rehydration, in append order
    pub fn pending(&self) -> &[E] {
        &self.pending
    }

    /// Empty the pending queue; called only after a successful persist
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    fn record(&mut self, event: E) {
        self.pending.push(event);
        self.version += 1;
    }

    fn mark_replayed(&mut self) {
        self.version += 1;
    }
}

impl<E> Default for Journal<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Base behavior shared by every aggregate.
///
/// Implementors supply the zero-state factory, the journal accessors, and
/// the event-application step; appending, versioning, and reconstruction
/// are provided on top of those.
pub trait AggregateRoot: Sized {
    /// Type name used to derive the stream identity; stable across
    /// processes
    const AGGREGATE_TYPE: &'static str;

    /// The aggregate's closed event vocabulary
    type Event: DomainEvent;

    /// Zero-state factory used as the starting point for replay.
    ///
    /// A zero-state instance is not a valid aggregate on its own; it only
    /// becomes one once its creation event is applied.
    fn empty() -> Self;

    /// Stable aggregate identity (nil until the creation event is applied)
    fn id(&self) -> Uuid;

    /// The aggregate's journal
    fn journal(&self) -> &Journal<Self::Event>;

    /// Mutable access to the journal
    fn journal_mut(&mut self) -> &mut Journal<Self::Event>;

    /// Event-application step: fold one event into the current state.
    ///
    /// Total over the event vocabulary, but rejects events that cannot
    /// apply in the current phase (for example anything before the creation
    /// event) with [`DomainError::UnsupportedEvent`] - such a stream is
    /// corrupt and must not be silently repaired.
    ///
    /// [`DomainError::UnsupportedEvent`]: crate::errors::DomainError::UnsupportedEvent
    fn when(&mut self, event: &Self::Event) -> DomainResult<()>;

    /// Registry of this aggregate's wire-level event names, built once per
    /// repository
    fn event_registry() -> EventTypeRegistry<Self::Event>;

    /// Count of events applied since the zero state
    fn version(&self) -> u64 {
        self.journal().version()
    }

    /// Ordered events appended since construction or rehydration.
    ///
    /// Does not clear the queue.
    fn uncommitted_events(&self) -> &[Self::Event] {
        self.journal().pending()
    }

    /// Empty the uncommitted queue; called by the repository after a
    /// successful persist
    fn clear_uncommitted_events(&mut self) {
        self.journal_mut().clear();
    }

    /// Apply an event to in-memory state and enqueue it for persistence.
    ///
    /// Behavior methods validate first, then append; the event is applied
    /// immediately so state reflects it without waiting for a save. The
    /// event is only enqueued once `when` accepts it, so a rejected
    /// application cannot leave a phantom record in the queue.
    fn append(&mut self, event: Self::Event) -> DomainResult<()> {
        self.when(&event)?;
        self.journal_mut().record(event);
        Ok(())
    }

    /// Reconstruct an aggregate by replaying its full event history.
    ///
    /// Fails with [`PersistenceError::EmptyHistory`] for an empty sequence:
    /// every aggregate's first event is its creation event, so there is no
    /// valid aggregate with zero events. After a successful replay the
    /// version equals the history length and the uncommitted queue is
    /// empty.
    fn replay(events: Vec<Self::Event>) -> PersistenceResult<Self> {
        if events.is_empty() {
            return Err(PersistenceError::EmptyHistory);
        }

        let mut aggregate = Self::empty();
        for event in &events {
            aggregate.when(event)?;
            aggregate.journal_mut().mark_replayed();
        }

        Ok(aggregate)
    }
}
