//! NATS JetStream Event Store
//!
//! Durable [`EventStore`] backed by NATS JetStream. Each aggregate owns one
//! subject; an append publishes the whole batch as a single message, so a
//! multi-event write is atomic, and the publish carries the
//! `Nats-Expected-Last-Subject-Sequence` header so the broker itself
//! enforces the optimistic-concurrency precondition. Two racing appends
//! against the same subject cannot both land: the broker rejects the one
//! whose expected sequence is stale.

use std::time::Duration;

use async_nats::jetstream::{self, context::Publish, stream::Stream};
use async_trait::async_trait;
use futures::StreamExt;
use tracing::debug;

use crate::errors::{PersistenceError, PersistenceResult};
use crate::event_store::{EventStore, RecordedEvent, StreamId};

/// Configuration for the JetStream event stream
#[derive(Debug, Clone)]
pub struct JetStreamConfig {
    /// Stream name
    pub stream_name: String,

    /// Subjects the stream captures
    pub subjects: Vec<String>,

    /// Maximum age of messages (default: unlimited; events are the source
    /// of truth and must not expire)
    pub max_age: Duration,

    /// Maximum bytes stored in the stream (default: 10GB)
    pub max_bytes: i64,

    /// Number of replicas (for clustered NATS)
    pub replicas: usize,
}

impl Default for JetStreamConfig {
    fn default() -> Self {
        Self {
            stream_name: "QNA_EVENTS".to_string(),
            subjects: vec![format!("{SUBJECT_PREFIX}.>")],
            max_age: Duration::ZERO,
            max_bytes: 10 * 1024 * 1024 * 1024,
            replicas: 1,
        }
    }
}

const SUBJECT_PREFIX: &str = "qna";

/// JetStream-backed event store
///
/// # Example
///
/// ```rust,no_run
/// use qna_domain::event_store::NatsEventStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = NatsEventStore::connect("nats://localhost:4222").await?;
///     // Use store...
///     Ok(())
/// }
/// ```
pub struct NatsEventStore {
    jetstream: jetstream::Context,
    stream: Stream,
}

impl NatsEventStore {
    /// Connect to NATS and create or get the event stream
    pub async fn connect(nats_url: &str) -> PersistenceResult<Self> {
        Self::connect_with_config(nats_url, JetStreamConfig::default()).await
    }

    /// Connect with custom stream configuration
    pub async fn connect_with_config(
        nats_url: &str,
        config: JetStreamConfig,
    ) -> PersistenceResult<Self> {
        let client = async_nats::connect(nats_url)
            .await
            .map_err(|e| PersistenceError::Connection(e.to_string()))?;

        let jetstream = jetstream::new(client);

        let stream = jetstream
            .get_or_create_stream(jetstream::stream::Config {
                name: config.stream_name.clone(),
                subjects: config.subjects.clone(),
                max_age: config.max_age,
                max_bytes: config.max_bytes,
                num_replicas: config.replicas,
                storage: jetstream::stream::StorageType::File,
                retention: jetstream::stream::RetentionPolicy::Limits,
                ..Default::default()
            })
            .await
            .map_err(|e| PersistenceError::Connection(e.to_string()))?;

        Ok(Self { jetstream, stream })
    }

    /// Subject owned by one aggregate's stream.
    ///
    /// Format: `qna.<aggregate_type>.<aggregate_id>`. One subject per
    /// aggregate keeps the broker's last-subject-sequence usable as the
    /// append precondition.
    fn subject(&self, stream: &StreamId) -> String {
        format!(
            "{SUBJECT_PREFIX}.{}.{}",
            stream.aggregate_type.to_lowercase(),
            stream.id
        )
    }

    /// Read a stream's batches plus the broker sequence of the last message
    /// on its subject.
    ///
    /// The broker sequence is what a conditional publish must name; the
    /// record sequences inside the payloads are the aggregate revision.
    async fn read_with_subject_sequence(
        &self,
        stream: &StreamId,
    ) -> PersistenceResult<(Vec<RecordedEvent>, u64)> {
        let consumer = self
            .stream
            .create_consumer(jetstream::consumer::pull::Config {
                filter_subject: self.subject(stream),
                ..Default::default()
            })
            .await
            .map_err(|e| PersistenceError::Connection(e.to_string()))?;

        let mut records = Vec::new();
        let mut last_subject_sequence = 0;

        // Fetch in bounded batches; a fetch timeout means the stream is
        // drained, not that something failed
        const BATCH_SIZE: usize = 10_000;

        loop {
            let batch = consumer
                .fetch()
                .max_messages(BATCH_SIZE)
                .expires(Duration::from_secs(2))
                .messages()
                .await;

            let mut messages = match batch {
                Ok(msgs) => msgs,
                Err(e) => {
                    let msg = e.to_string().to_lowercase();
                    if msg.contains("timeout") || msg.contains("timed out") {
                        break;
                    }
                    return Err(PersistenceError::Connection(e.to_string()));
                }
            };

            let mut batch_count = 0;

            while let Some(message) = messages.next().await {
                let message =
                    message.map_err(|e| PersistenceError::Connection(e.to_string()))?;

                let info = message
                    .info()
                    .map_err(|e| PersistenceError::Connection(e.to_string()))?;
                last_subject_sequence = last_subject_sequence.max(info.stream_sequence);

                let batch: Vec<RecordedEvent> = serde_json::from_slice(&message.payload)?;
                records.extend(batch);

                message
                    .ack()
                    .await
                    .map_err(|e| PersistenceError::Connection(e.to_string()))?;

                batch_count += 1;
            }

            if batch_count < BATCH_SIZE {
                break;
            }
        }

        records.sort_by_key(|r| r.sequence);

        Ok((records, last_subject_sequence))
    }
}

#[async_trait]
impl EventStore for NatsEventStore {
    async fn append(
        &self,
        stream: &StreamId,
        records: Vec<RecordedEvent>,
        expected_version: u64,
    ) -> PersistenceResult<u64> {
        let (existing, last_subject_sequence) = self.read_with_subject_sequence(stream).await?;

        let actual = existing.last().map(|r| r.sequence).unwrap_or(0);
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
            last_subject_sequence,
            "publishing batch"
        );

        let version = records.last().map(|r| r.sequence).unwrap_or(actual);
        let payload = serde_json::to_vec(&records)?;

        // The whole batch is one message, so the write is atomic, and the
        // expected-last-subject-sequence header makes the broker reject a
        // publish that raced with another writer. The early check above
        // only exists to report the actual revision in the error.
        let publish = Publish::build()
            .payload(payload.into())
            .expected_last_subject_sequence(last_subject_sequence);

        // Double await: the first enqueues the publish, the second waits
        // for the broker's ack
        let ack = self
            .jetstream
            .send_publish(self.subject(stream), publish)
            .await
            .map_err(|e| PersistenceError::Connection(e.to_string()))?
            .await;

        if let Err(e) = ack {
            let msg = e.to_string().to_lowercase();
            if msg.contains("wrong last sequence") {
                let racer = self.version(stream).await?;
                return Err(PersistenceError::ConcurrencyConflict {
                    expected: expected_version,
                    actual: racer,
                });
            }
            return Err(PersistenceError::Connection(e.to_string()));
        }

        Ok(version)
    }

    async fn read(&self, stream: &StreamId) -> PersistenceResult<Vec<RecordedEvent>> {
        let (records, _) = self.read_with_subject_sequence(stream).await?;
        Ok(records)
    }
}
