//! Error types for the domain core
//!
//! Two taxonomies, kept deliberately separate:
//!
//! - [`DomainError`]: validation rejections raised by aggregate behavior
//!   methods before any event is appended. The aggregate is left unchanged.
//! - [`PersistenceError`]: failures at the event store boundary. Concurrency
//!   conflicts are surfaced to the caller, which owns the retry policy;
//!   structural errors (unknown event type, empty history) are fatal for the
//!   affected operation and never silently skipped.

use thiserror::Error;
use uuid::Uuid;

use crate::services::ServiceError;
use crate::state_machine::TransitionError;

/// Validation errors raised by aggregate behavior methods.
///
/// Every variant is raised synchronously, before any event is appended, so a
/// failed call leaves both the derived state and the uncommitted queue
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// An input failed validation (blank text, nil identifier, ...)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Tag is already present on the aggregate
    #[error("tag '{0}' is already present")]
    DuplicateTag(String),

    /// Tag is not present on the aggregate
    #[error("tag '{0}' is not present")]
    TagNotFound(String),

    /// Referenced answer does not exist on this question
    #[error("answer {0} not found in answers")]
    AnswerNotFound(Uuid),

    /// Voter identity is not a known profile
    #[error("user {0} is not a known profile")]
    UnknownUser(Uuid),

    /// Lifecycle trigger not permitted in the current state
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    /// Event cannot be applied in the aggregate's current phase.
    ///
    /// Indicates either stream corruption or a schema mismatch (for example
    /// a non-creation event arriving before the creation event).
    #[error("unsupported event '{0}' for current aggregate state")]
    UnsupportedEvent(String),

    /// An external existence check failed with a transport error
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Result type for aggregate behavior methods
pub type DomainResult<T> = Result<T, DomainError>;

/// Failures at the event store boundary.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Expected stream revision did not match at append time.
    ///
    /// Another session appended to the same stream between load and save.
    /// Recommended caller policy is reload-mutate-retry; the repository
    /// itself never retries.
    #[error("expected stream revision {expected}, found {actual}")]
    ConcurrencyConflict { expected: u64, actual: u64 },

    /// Stream has no events for the requested identity
    #[error("stream '{0}' has no events")]
    NotFound(String),

    /// Stream record carries an event type the registry does not know about.
    ///
    /// The running binary is older than the data it is reading, or the
    /// stream is corrupt. Skipping the record would corrupt replay, so the
    /// whole read fails.
    #[error("unknown event type '{0}'")]
    UnknownEventType(String),

    /// Reconstruction was attempted from an empty event sequence.
    ///
    /// Every aggregate's first event is its creation event, so a valid
    /// history is never empty.
    #[error("cannot reconstruct an aggregate from an empty history")]
    EmptyHistory,

    /// Event payload could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Opaque transport failure from the underlying log store
    #[error("event store connection error: {0}")]
    Connection(String),

    /// A decoded historical event was rejected by the aggregate's
    /// event-application step
    #[error("replay failed: {0}")]
    Replay(#[from] DomainError),
}

/// Result type for event store and repository operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Serialization(err.to_string())
    }
}
