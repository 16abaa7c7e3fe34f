//! Aggregate Repository
//!
//! Persists an aggregate's uncommitted events to its append-only stream and
//! reconstructs aggregates by reading and replaying full histories. One
//! repository instance serves one aggregate type against one store.
//!
//! The repository never retries: a concurrency conflict or an unknown event
//! type is surfaced to the caller, which owns the reload-and-reapply policy.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::aggregate::AggregateRoot;
use crate::errors::{PersistenceError, PersistenceResult};
use crate::event_store::{EventStore, RecordedEvent, StreamId};
use crate::events::{DomainEvent, EventTypeRegistry};

/// Repository for one aggregate type over one event store
pub struct AggregateRepository<A: AggregateRoot, S: EventStore> {
    store: Arc<S>,
    registry: EventTypeRegistry<A::Event>,
    _aggregate: PhantomData<fn() -> A>,
}

impl<A: AggregateRoot, S: EventStore> AggregateRepository<A, S> {
    /// Create a repository over the given store.
    ///
    /// The aggregate's event type registry is built once here and shared
    /// read-only for the repository's lifetime.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            registry: A::event_registry(),
            _aggregate: PhantomData,
        }
    }

    /// Persist an aggregate's uncommitted events.
    ///
    /// A no-op when the queue is empty. Otherwise the events are encoded and
    /// appended conditioned on the stream revision the aggregate was loaded
    /// at; a mismatch fails with
    /// [`PersistenceError::ConcurrencyConflict`] and writes nothing. On
    /// success the uncommitted queue is cleared.
    #[instrument(skip_all, fields(aggregate_type = A::AGGREGATE_TYPE))]
    pub async fn save(&self, aggregate: &mut A) -> PersistenceResult<()> {
        let pending = aggregate.uncommitted_events();
        if pending.is_empty() {
            debug!("nothing to save");
            return Ok(());
        }

        // Revision the stream had when this aggregate was loaded
        let expected_version = aggregate.version() - pending.len() as u64;

        let mut records = Vec::with_capacity(pending.len());
        for (i, event) in pending.iter().enumerate() {
            records.push(RecordedEvent {
                event_id: Uuid::now_v7(),
                sequence: expected_version + i as u64 + 1,
                recorded_at: Utc::now(),
                event_type: event.event_type().to_string(),
                data: event.payload()?,
            });
        }

        let stream = StreamId::for_aggregate::<A>(aggregate.id());
        debug!(
            stream = %stream,
            count = records.len(),
            expected_version,
            "saving aggregate"
        );

        self.store
            .append(&stream, records, expected_version)
            .await?;

        aggregate.clear_uncommitted_events();
        Ok(())
    }

    /// Reconstruct an aggregate by replaying its full stream.
    ///
    /// Fails with [`PersistenceError::NotFound`] when the stream has no
    /// records and with [`PersistenceError::UnknownEventType`] when any
    /// record carries a type the registry does not know about; the read is
    /// never partially applied.
    #[instrument(skip_all, fields(aggregate_type = A::AGGREGATE_TYPE, %id))]
    pub async fn find(&self, id: Uuid) -> PersistenceResult<A> {
        let stream = StreamId::for_aggregate::<A>(id);
        let records = self.store.read(&stream).await?;

        if records.is_empty() {
            return Err(PersistenceError::NotFound(stream.to_string()));
        }

        debug!(stream = %stream, count = records.len(), "replaying stream");

        let mut events = Vec::with_capacity(records.len());
        for record in &records {
            events.push(self.registry.decode(&record.event_type, &record.data)?);
        }

        A::replay(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Question;
    use crate::event_store::InMemoryEventStore;

    fn repository() -> (
        Arc<InMemoryEventStore>,
        AggregateRepository<Question, InMemoryEventStore>,
    ) {
        let store = Arc::new(InMemoryEventStore::new());
        let repo = AggregateRepository::new(store.clone());
        (store, repo)
    }

    #[tokio::test]
    async fn test_save_then_find_round_trips() {
        let (_, repo) = repository();

        let mut question = Question::create("Title", "Body", Uuid::now_v7()).unwrap();
        question.set_approved().unwrap();
        let id = question.id();

        repo.save(&mut question).await.unwrap();
        assert!(question.uncommitted_events().is_empty());

        let loaded = repo.find(id).await.unwrap();
        assert_eq!(loaded.id(), id);
        assert_eq!(loaded.version(), 2);
        assert_eq!(loaded.title(), "Title");
    }

    #[tokio::test]
    async fn test_save_with_empty_queue_is_noop() {
        let (store, repo) = repository();

        let mut question = Question::create("Title", "Body", Uuid::now_v7()).unwrap();
        repo.save(&mut question).await.unwrap();

        let streams_before = store.stream_count().await;
        repo.save(&mut question).await.unwrap();
        assert_eq!(store.stream_count().await, streams_before);
    }

    #[tokio::test]
    async fn test_find_missing_aggregate_fails() {
        let (_, repo) = repository();

        let err = repo.find(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, PersistenceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_saves_conflict() {
        let (_, repo) = repository();

        let mut question = Question::create("Title", "Body", Uuid::now_v7()).unwrap();
        let id = question.id();
        repo.save(&mut question).await.unwrap();

        let mut first = repo.find(id).await.unwrap();
        let mut second = repo.find(id).await.unwrap();

        first.update_title("From the first session").unwrap();
        repo.save(&mut first).await.unwrap();

        second.update_title("From the second session").unwrap();
        let err = repo.save(&mut second).await.unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::ConcurrencyConflict {
                expected: 1,
                actual: 2
            }
        ));
    }
}
