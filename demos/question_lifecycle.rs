//! Drives a Question through its full lifecycle against the in-memory
//! event store, then demonstrates the optimistic concurrency check.
//!
//! Run with: `cargo run --example question_lifecycle`

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use qna_domain::aggregate::{Profile, Question};
use qna_domain::event_store::InMemoryEventStore;
use qna_domain::services::{ProfileService, ServiceError, ServiceResult};
use qna_domain::{AggregateRepository, AggregateRoot, PersistenceError};

/// Profile existence check backed by the profile repository
struct RepositoryProfileService {
    profiles: AggregateRepository<Profile, InMemoryEventStore>,
}

#[async_trait]
impl ProfileService for RepositoryProfileService {
    async fn exists(&self, profile_id: Uuid) -> ServiceResult<bool> {
        match self.profiles.find(profile_id).await {
            Ok(_) => Ok(true),
            Err(PersistenceError::NotFound(_)) => Ok(false),
            Err(e) => Err(ServiceError(e.to_string())),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qna_domain=debug,question_lifecycle=info".into()),
        )
        .init();

    let store = Arc::new(InMemoryEventStore::new());
    let questions: AggregateRepository<Question, _> = AggregateRepository::new(store.clone());
    let profile_repo: AggregateRepository<Profile, _> = AggregateRepository::new(store.clone());
    let profiles = RepositoryProfileService {
        profiles: AggregateRepository::new(store.clone()),
    };

    // Register the participants
    let asker_id = Uuid::now_v7();
    let mut asker = Profile::create(asker_id, "ada", "ada@example.com")?;
    profile_repo.save(&mut asker).await?;

    let answerer_id = Uuid::now_v7();
    let mut answerer = Profile::create(answerer_id, "alan", "alan@example.com")?;
    profile_repo.save(&mut answerer).await?;

    // Ask, tag, and persist a question
    let mut question = Question::create(
        "How do I rebuild state from an event stream?",
        "I keep a history of domain events per aggregate and want current state.",
        asker_id,
    )?;
    question.add_tag("event-sourcing")?;
    let question_id = question.id();
    questions.save(&mut question).await?;
    tracing::info!(%question_id, "question persisted");

    // Reload, approve, answer, and select the answer
    let mut question = questions.find(question_id).await?;
    question.set_approved()?;
    let answer_id = question.add_answer(
        "Replay the events in order through the aggregate's apply step.",
        answerer_id,
    )?;
    question.set_answered(answer_id)?;
    question.upvote(answerer_id, &profiles).await?;
    questions.save(&mut question).await?;

    let loaded = questions.find(question_id).await?;
    tracing::info!(
        state = %loaded.state(),
        version = loaded.version(),
        rating = loaded.rating(),
        "reloaded question"
    );

    // Two sessions load the same question; only one save can land
    let mut session_a = questions.find(question_id).await?;
    let mut session_b = questions.find(question_id).await?;

    session_a.update_title("How do I rebuild aggregate state from events?")?;
    session_b.add_tag("replay")?;

    questions.save(&mut session_a).await?;
    match questions.save(&mut session_b).await {
        Err(PersistenceError::ConcurrencyConflict { expected, actual }) => {
            tracing::info!(expected, actual, "second session lost the race, reloading");
        }
        other => anyhow::bail!("expected a concurrency conflict, got {other:?}"),
    }

    // Reload-and-reapply resolves the conflict
    let mut session_b = questions.find(question_id).await?;
    session_b.add_tag("replay")?;
    questions.save(&mut session_b).await?;

    let final_state = questions.find(question_id).await?;
    tracing::info!(
        version = final_state.version(),
        tags = ?final_state.tags(),
        title = final_state.title(),
        "final state"
    );

    Ok(())
}
