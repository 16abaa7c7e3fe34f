//! Event-sourced domain core for a Q&A platform
//!
//! Aggregates (Question, Profile, Tag) exist only as folds over ordered
//! event streams. The repository persists uncommitted events to an
//! append-only stream per aggregate with optimistic concurrency, and
//! reconstructs aggregates by replaying their full histories.

pub mod aggregate;
pub mod errors;
pub mod event_store;
pub mod events;
pub mod repository;
pub mod services;
pub mod state_machine;

// Re-export commonly used types
pub use aggregate::{AggregateRoot, Profile, Question, Tag};
pub use errors::{DomainError, DomainResult, PersistenceError, PersistenceResult};
pub use event_store::{EventStore, InMemoryEventStore, NatsEventStore};
pub use repository::AggregateRepository;
