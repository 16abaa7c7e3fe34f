//! In-Memory Event Store
//!
//! Process-local [`EventStore`] backed by a map of stream name to record
//! vector. Carries the full conditional-append semantics of the durable
//! stores, so tests and demos exercise the same concurrency behavior the
//! production backend enforces.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::{PersistenceError, PersistenceResult};
use crate::event_store::{EventStore, RecordedEvent, StreamId};

/// In-memory event store for tests and demos
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    streams: RwLock<HashMap<String, Vec<RecordedEvent>>>,
}

impl InMemoryEventStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of streams with at least one record
    pub async fn stream_count(&self) -> usize {
        self.streams.read().await.len()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(
        &self,
        stream: &StreamId,
        records: Vec<RecordedEvent>,
        expected_version: u64,
    ) -> PersistenceResult<u64> {
        let mut streams = self.streams.write().await;
        let name = stream.to_string();

        // A rejected append must not materialize an empty stream entry
        let actual = streams
            .get(&name)
            .and_then(|records| records.last())
            .map(|r| r.sequence)
            .unwrap_or(0);
        if actual != expected_version {
            return Err(PersistenceError::ConcurrencyConflict {
                expected: expected_version,
                actual,
            });
        }

        debug!(
            stream = %stream,
            count = records.len(),
            expected_version,
            "appending records"
        );

        let entry = streams.entry(name).or_default();
        entry.extend(records);
        Ok(entry.last().map(|r| r.sequence).unwrap_or(0))
    }

    async fn read(&self, stream: &StreamId) -> PersistenceResult<Vec<RecordedEvent>> {
        let streams = self.streams.read().await;
        Ok(streams.get(&stream.to_string()).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(sequence: u64) -> RecordedEvent {
        RecordedEvent {
            event_id: Uuid::now_v7(),
            sequence,
            recorded_at: Utc::now(),
            event_type: "Pinged".to_string(),
            data: serde_json::Value::Null,
        }
    }

    fn stream() -> StreamId {
        StreamId {
            aggregate_type: "Counter",
            id: Uuid::now_v7(),
        }
    }

    #[tokio::test]
    async fn test_append_then_read_preserves_order() {
        let store = InMemoryEventStore::new();
        let stream = stream();

        store
            .append(&stream, vec![record(1), record(2)], 0)
            .await
            .unwrap();
        let version = store.append(&stream, vec![record(3)], 2).await.unwrap();
        assert_eq!(version, 3);

        let records = store.read(&stream).await.unwrap();
        let sequences: Vec<u64> = records.iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_stale_expected_version_is_rejected() {
        let store = InMemoryEventStore::new();
        let stream = stream();

        store.append(&stream, vec![record(1)], 0).await.unwrap();
        let err = store.append(&stream, vec![record(2)], 0).await.unwrap_err();

        assert!(matches!(
            err,
            PersistenceError::ConcurrencyConflict {
                expected: 0,
                actual: 1
            }
        ));

        // Nothing was written by the failed append
        assert_eq!(store.read(&stream).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_append_does_not_create_a_stream() {
        let store = InMemoryEventStore::new();
        let stream = stream();

        let err = store.append(&stream, vec![record(2)], 1).await.unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::ConcurrencyConflict {
                expected: 1,
                actual: 0
            }
        ));

        assert_eq!(store.stream_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_stream_reads_empty() {
        let store = InMemoryEventStore::new();
        let records = store.read(&stream()).await.unwrap();
        assert!(records.is_empty());

        assert_eq!(store.version(&stream()).await.unwrap(), 0);
    }
}
