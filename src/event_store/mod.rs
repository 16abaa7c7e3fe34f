//! Event Store Abstraction
//!
//! Append-only storage of domain events, one logical stream per
//! `(aggregate-type, aggregate-id)` pair.
//!
//! # Architecture
//!
//! ```text
//! Behavior method → Aggregate → Events → Repository → EventStore
//!                                                         ↓
//!                                                 Persistent Storage
//! ```
//!
//! # Store Requirements
//!
//! 1. **Append-Only**: records are never updated or deleted
//! 2. **Ordered**: records keep append order within one stream
//! 3. **Conditional**: appends are checked against an expected revision
//! 4. **Atomic**: a multi-record append succeeds or fails as a unit
//! 5. **Replay**: records can be read back from the stream start, in order

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::AggregateRoot;
use crate::errors::PersistenceResult;

pub mod memory;
pub mod nats;

pub use memory::InMemoryEventStore;
pub use nats::NatsEventStore;

/// Identity of one aggregate's stream.
///
/// Derived deterministically from the aggregate type name and the aggregate
/// id, so any two processes compute the same stream identity for the same
/// aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamId {
    /// Aggregate type name, stable across processes
    pub aggregate_type: &'static str,

    /// Aggregate identity
    pub id: Uuid,
}

impl StreamId {
    /// Stream identity for a concrete aggregate type
    pub fn for_aggregate<A: AggregateRoot>(id: Uuid) -> Self {
        Self {
            aggregate_type: A::AGGREGATE_TYPE,
            id,
        }
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.aggregate_type, self.id)
    }
}

/// Stored record envelope for one domain event.
///
/// `event_type` must exactly match a key in the aggregate's event type
/// registry for the record to be readable. `sequence` is the record's
/// 1-based position within its stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// Unique record id (UUID v7 for time-ordering)
    pub event_id: Uuid,

    /// Sequence number within the stream, starting at 1
    pub sequence: u64,

    /// When the record was produced
    pub recorded_at: DateTime<Utc>,

    /// Wire-level event type name
    pub event_type: String,

    /// Serialized event payload
    pub data: serde_json::Value,
}

/// Trait for append-only event stream storage.
///
/// Implementations must ensure:
///
/// - **Atomicity**: appending a batch succeeds or fails as a unit
/// - **Consistency**: record ordering within a stream is append order
/// - **Concurrency**: an append with a stale expected revision fails with
///   [`PersistenceError::ConcurrencyConflict`] and writes nothing
///
/// [`PersistenceError::ConcurrencyConflict`]: crate::errors::PersistenceError::ConcurrencyConflict
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append records to a stream, conditioned on its current revision.
    ///
    /// `expected_version` is the revision the writer observed when it loaded
    /// the aggregate (0 for a brand new stream). Returns the stream revision
    /// after the append.
    async fn append(
        &self,
        stream: &StreamId,
        records: Vec<RecordedEvent>,
        expected_version: u64,
    ) -> PersistenceResult<u64>;

    /// Read a stream's full record history in append order.
    ///
    /// A stream with no records yields an empty vector; whether that is an
    /// error is the caller's decision.
    async fn read(&self, stream: &StreamId) -> PersistenceResult<Vec<RecordedEvent>>;

    /// Current revision of a stream (0 when the stream has no records)
    async fn version(&self, stream: &StreamId) -> PersistenceResult<u64> {
        let records = self.read(stream).await?;
        Ok(records.iter().map(|r| r.sequence).max().unwrap_or(0))
    }
}
