//! Question Domain Events
//!
//! The full event vocabulary of the Question aggregate, one payload struct
//! per event. The closed [`QuestionEvent`] enum is what the aggregate's
//! event-application step matches on; unknown or future wire names are
//! rejected at decode time by the registry, never defaulted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::registry::EventTypeRegistry;
use super::DomainEvent;

/// Question Domain Events
///
/// Each variant corresponds to one state transition of the Question
/// aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum QuestionEvent {
    /// Question was asked
    QuestionCreated(QuestionCreated),

    /// Title was replaced
    TitleUpdated(TitleUpdated),

    /// Body text was replaced
    TextUpdated(TextUpdated),

    /// Moderator approved the question for display
    QuestionApproved(QuestionApproved),

    /// A new answer was posted
    AnswerAdded(AnswerAdded),

    /// Author selected an answer
    QuestionAnswered(QuestionAnswered),

    /// A comment was posted on the question itself
    CommentAdded(CommentAdded),

    /// A comment was posted on one of the answers
    CommentAddedToAnswer(CommentAddedToAnswer),

    /// An answer's text was replaced
    AnswerTextUpdated(AnswerTextUpdated),

    /// A tag was attached
    TagAdded(TagAdded),

    /// A tag was detached
    TagRemoved(TagRemoved),

    /// A user upvoted the question
    UpvotedBy(UpvotedBy),

    /// A user downvoted the question
    DownvotedBy(DownvotedBy),
}

/// Question was asked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCreated {
    /// Aggregate identity
    pub id: Uuid,

    /// Question title
    pub title: String,

    /// Question body text
    pub text: String,

    /// Profile that asked the question
    pub asked_by_id: Uuid,

    /// When the question was asked
    pub created_at: DateTime<Utc>,
}

/// Title was replaced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleUpdated {
    pub title: String,
}

/// Body text was replaced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextUpdated {
    pub text: String,
}

/// Moderator approved the question for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionApproved;

/// A new answer was posted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerAdded {
    /// Identity of the new answer within this question
    pub answer_id: Uuid,

    /// Answer text
    pub text: String,

    /// Profile that posted the answer
    pub answered_by_id: Uuid,

    /// When the answer was posted
    pub created_at: DateTime<Utc>,
}

/// Author selected an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswered {
    /// Identity of the selected answer
    pub answer_id: Uuid,
}

/// A comment was posted on the question itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAdded {
    pub comment_id: Uuid,
    pub text: String,
    pub commented_by_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A comment was posted on one of the answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAddedToAnswer {
    /// Identity of the answer receiving the comment
    pub answer_id: Uuid,
    pub comment_id: Uuid,
    pub text: String,
    pub commented_by_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// An answer's text was replaced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerTextUpdated {
    pub answer_id: Uuid,
    pub text: String,
}

/// A tag was attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagAdded {
    pub name: String,
}

/// A tag was detached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRemoved {
    pub name: String,
}

/// A user upvoted the question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpvotedBy {
    pub user_id: Uuid,
}

/// A user downvoted the question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownvotedBy {
    pub user_id: Uuid,
}

impl DomainEvent for QuestionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            QuestionEvent::QuestionCreated(_) => "QuestionCreated",
            QuestionEvent::TitleUpdated(_) => "TitleUpdated",
            QuestionEvent::TextUpdated(_) => "TextUpdated",
            QuestionEvent::QuestionApproved(_) => "QuestionApproved",
            QuestionEvent::AnswerAdded(_) => "AnswerAdded",
            QuestionEvent::QuestionAnswered(_) => "QuestionAnswered",
            QuestionEvent::CommentAdded(_) => "CommentAdded",
            QuestionEvent::CommentAddedToAnswer(_) => "CommentAddedToAnswer",
            QuestionEvent::AnswerTextUpdated(_) => "AnswerTextUpdated",
            QuestionEvent::TagAdded(_) => "TagAdded",
            QuestionEvent::TagRemoved(_) => "TagRemoved",
            QuestionEvent::UpvotedBy(_) => "UpvotedBy",
            QuestionEvent::DownvotedBy(_) => "DownvotedBy",
        }
    }

    fn payload(&self) -> serde_json::Result<Value> {
        match self {
            QuestionEvent::QuestionCreated(e) => serde_json::to_value(e),
            QuestionEvent::TitleUpdated(e) => serde_json::to_value(e),
            QuestionEvent::TextUpdated(e) => serde_json::to_value(e),
            QuestionEvent::QuestionApproved(e) => serde_json::to_value(e),
            QuestionEvent::AnswerAdded(e) => serde_json::to_value(e),
            QuestionEvent::QuestionAnswered(e) => serde_json::to_value(e),
            QuestionEvent::CommentAdded(e) => serde_json::to_value(e),
            QuestionEvent::CommentAddedToAnswer(e) => serde_json::to_value(e),
            QuestionEvent::AnswerTextUpdated(e) => serde_json::to_value(e),
            QuestionEvent::TagAdded(e) => serde_json::to_value(e),
            QuestionEvent::TagRemoved(e) => serde_json::to_value(e),
            QuestionEvent::UpvotedBy(e) => serde_json::to_value(e),
            QuestionEvent::DownvotedBy(e) => serde_json::to_value(e),
        }
    }
}

impl QuestionEvent {
    /// Build the registry of all Question event types.
    ///
    /// Every wire name the Question aggregate has ever written must stay
    /// registered here; removing one makes historical streams unreadable.
    pub fn registry() -> EventTypeRegistry<QuestionEvent> {
        let mut registry = EventTypeRegistry::new();

        registry.register("QuestionCreated", |data| {
            Ok(QuestionEvent::QuestionCreated(serde_json::from_value(
                data.clone(),
            )?))
        });
        registry.register("TitleUpdated", |data| {
            Ok(QuestionEvent::TitleUpdated(serde_json::from_value(
                data.clone(),
            )?))
        });
        registry.register("TextUpdated", |data| {
            Ok(QuestionEvent::TextUpdated(serde_json::from_value(
                data.clone(),
            )?))
        });
        registry.register("QuestionApproved", |data| {
            Ok(QuestionEvent::QuestionApproved(serde_json::from_value(
                data.clone(),
            )?))
        });
        registry.register("AnswerAdded", |data| {
            Ok(QuestionEvent::AnswerAdded(serde_json::from_value(
                data.clone(),
            )?))
        });
        registry.register("QuestionAnswered", |data| {
            Ok(QuestionEvent::QuestionAnswered(serde_json::from_value(
                data.clone(),
            )?))
        });
        registry.register("CommentAdded", |data| {
            Ok(QuestionEvent::CommentAdded(serde_json::from_value(
                data.clone(),
            )?))
        });
        registry.register("CommentAddedToAnswer", |data| {
            Ok(QuestionEvent::CommentAddedToAnswer(serde_json::from_value(
                data.clone(),
            )?))
        });
        registry.register("AnswerTextUpdated", |data| {
            Ok(QuestionEvent::AnswerTextUpdated(serde_json::from_value(
                data.clone(),
            )?))
        });
        registry.register("TagAdded", |data| {
            Ok(QuestionEvent::TagAdded(serde_json::from_value(
                data.clone(),
            )?))
        });
        registry.register("TagRemoved", |data| {
            Ok(QuestionEvent::TagRemoved(serde_json::from_value(
                data.clone(),
            )?))
        });
        registry.register("UpvotedBy", |data| {
            Ok(QuestionEvent::UpvotedBy(serde_json::from_value(
                data.clone(),
            )?))
        });
        registry.register("DownvotedBy", |data| {
            Ok(QuestionEvent::DownvotedBy(serde_json::from_value(
                data.clone(),
            )?))
        });

        registry
    }
}
