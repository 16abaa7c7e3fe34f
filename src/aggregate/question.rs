//! Question Aggregate
//!
//! The most elaborate aggregate in the domain: a lifecycle governed by the
//! question state machine, nested answers (each with its own comment set)
//! indexed by identity, question-level comments, a unique tag set, and a
//! per-voter rating map with toggle semantics.
//!
//! Every behavior method validates its inputs, then appends exactly one
//! event, or fails before appending anything. All derived state is written
//! only inside [`Question::when`], so live mutation and replay produce
//! identical state.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::aggregate::{AggregateRoot, Journal};
use crate::errors::{DomainError, DomainResult};
use crate::events::question::{
    AnswerAdded, AnswerTextUpdated, CommentAdded, CommentAddedToAnswer, DownvotedBy,
    QuestionAnswered, QuestionApproved, QuestionCreated, QuestionEvent, TagAdded, TagRemoved,
    TextUpdated, TitleUpdated, UpvotedBy,
};
use crate::events::EventTypeRegistry;
use crate::services::ProfileService;
use crate::state_machine::{QuestionState, QuestionTrigger, StateMachine};

/// A comment on a question or on one of its answers.
///
/// Owned exclusively by the parent aggregate; it has no persistence identity
/// outside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Comment identity within the parent
    pub id: Uuid,

    /// Comment text
    pub text: String,

    /// Profile that posted the comment
    pub commented_by_id: Uuid,

    /// When the comment was posted
    pub created_at: DateTime<Utc>,
}

/// An answer posted on a question, with its own nested comment set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// Answer identity within the question
    pub id: Uuid,

    /// Answer text
    pub text: String,

    /// Profile that posted the answer
    pub answered_by_id: Uuid,

    /// When the answer was posted
    pub created_at: DateTime<Utc>,

    /// Comments posted on this answer, in post order
    pub comments: Vec<Comment>,
}

/// A question with its full derived state
#[derive(Debug, Clone)]
pub struct Question {
    id: Uuid,
    title: String,
    text: String,
    asked_by_id: Uuid,
    created_at: Option<DateTime<Utc>>,
    state: QuestionState,
    selected_answer_id: Option<Uuid>,
    answers: HashMap<Uuid, Answer>,
    comments: Vec<Comment>,
    tags: HashSet<String>,
    ratings: HashMap<Uuid, i8>,
    journal: Journal<QuestionEvent>,
}

impl Question {
    /// Ask a new question.
    ///
    /// Title and text must be non-blank and the asker must be a real
    /// identity.
    pub fn create(title: &str, text: &str, asked_by_id: Uuid) -> DomainResult<Self> {
        non_blank(title, "title")?;
        non_blank(text, "text")?;
        if asked_by_id.is_nil() {
            return Err(DomainError::InvalidArgument(
                "asked_by_id must not be nil".to_string(),
            ));
        }

        let mut question = Self::empty();
        question.append(QuestionEvent::QuestionCreated(QuestionCreated {
            id: Uuid::now_v7(),
            title: title.to_string(),
            text: text.to_string(),
            asked_by_id,
            created_at: Utc::now(),
        }))?;

        Ok(question)
    }

    /// Replace the title
    pub fn update_title(&mut self, title: &str) -> DomainResult<()> {
        non_blank(title, "title")?;
        self.append(QuestionEvent::TitleUpdated(TitleUpdated {
            title: title.to_string(),
        }))
    }

    /// Replace the body text
    pub fn update_text(&mut self, text: &str) -> DomainResult<()> {
        non_blank(text, "text")?;
        self.append(QuestionEvent::TextUpdated(TextUpdated {
            text: text.to_string(),
        }))
    }

    /// Approve the question for display.
    ///
    /// Fails with [`DomainError::InvalidTransition`] unless the lifecycle
    /// permits `Approve` from the current state.
    pub fn set_approved(&mut self) -> DomainResult<()> {
        self.append(QuestionEvent::QuestionApproved(QuestionApproved))
    }

    /// Post a new answer, returning its identity
    pub fn add_answer(&mut self, text: &str, answered_by_id: Uuid) -> DomainResult<Uuid> {
        non_blank(text, "text")?;

        let answer_id = Uuid::now_v7();
        self.append(QuestionEvent::AnswerAdded(AnswerAdded {
            answer_id,
            text: text.to_string(),
            answered_by_id,
            created_at: Utc::now(),
        }))?;

        Ok(answer_id)
    }

    /// Select an answer, moving the question to `Answered`.
    ///
    /// The answer must already be posted on this question and the lifecycle
    /// must permit `Answer` from the current state.
    pub fn set_answered(&mut self, answer_id: Uuid) -> DomainResult<()> {
        if !self.answers.contains_key(&answer_id) {
            return Err(DomainError::AnswerNotFound(answer_id));
        }

        self.append(QuestionEvent::QuestionAnswered(QuestionAnswered {
            answer_id,
        }))
    }

    /// Post a comment on the question itself, returning its identity
    pub fn add_comment(&mut self, text: &str, commented_by_id: Uuid) -> DomainResult<Uuid> {
        non_blank(text, "text")?;

        let comment_id = Uuid::now_v7();
        self.append(QuestionEvent::CommentAdded(CommentAdded {
            comment_id,
            text: text.to_string(),
            commented_by_id,
            created_at: Utc::now(),
        }))?;

        Ok(comment_id)
    }

    /// Post a comment on one of the answers, returning the comment identity
    pub fn add_comment_to_answer(
        &mut self,
        answer_id: Uuid,
        text: &str,
        commented_by_id: Uuid,
    ) -> DomainResult<Uuid> {
        if !self.answers.contains_key(&answer_id) {
            return Err(DomainError::AnswerNotFound(answer_id));
        }
        non_blank(text, "text")?;

        let comment_id = Uuid::now_v7();
        self.append(QuestionEvent::CommentAddedToAnswer(CommentAddedToAnswer {
            answer_id,
            comment_id,
            text: text.to_string(),
            commented_by_id,
            created_at: Utc::now(),
        }))?;

        Ok(comment_id)
    }

    /// Replace an answer's text
    pub fn update_answer_text(&mut self, answer_id: Uuid, text: &str) -> DomainResult<()> {
        if !self.answers.contains_key(&answer_id) {
            return Err(DomainError::AnswerNotFound(answer_id));
        }
        non_blank(text, "text")?;

        self.append(QuestionEvent::AnswerTextUpdated(AnswerTextUpdated {
            answer_id,
            text: text.to_string(),
        }))
    }

    /// Attach a tag; fails with [`DomainError::DuplicateTag`] if already
    /// present
    pub fn add_tag(&mut self, name: &str) -> DomainResult<()> {
        if self.tags.contains(name) {
            return Err(DomainError::DuplicateTag(name.to_string()));
        }

        self.append(QuestionEvent::TagAdded(TagAdded {
            name: name.to_string(),
        }))
    }

    /// Detach a tag; fails with [`DomainError::TagNotFound`] if absent
    pub fn remove_tag(&mut self, name: &str) -> DomainResult<()> {
        if !self.tags.contains(name) {
            return Err(DomainError::TagNotFound(name.to_string()));
        }

        self.append(QuestionEvent::TagRemoved(TagRemoved {
            name: name.to_string(),
        }))
    }

    /// Record an upvote by the given user.
    ///
    /// A repeated upvote retracts the vote; an upvote over a standing
    /// downvote flips it. The voter must exist in the profile directory.
    pub async fn upvote(
        &mut self,
        user_id: Uuid,
        profiles: &dyn ProfileService,
    ) -> DomainResult<()> {
        if !profiles.exists(user_id).await? {
            return Err(DomainError::UnknownUser(user_id));
        }

        self.append(QuestionEvent::UpvotedBy(UpvotedBy { user_id }))
    }

    /// Record a downvote by the given user; symmetric with [`Self::upvote`]
    pub async fn downvote(
        &mut self,
        user_id: Uuid,
        profiles: &dyn ProfileService,
    ) -> DomainResult<()> {
        if !profiles.exists(user_id).await? {
            return Err(DomainError::UnknownUser(user_id));
        }

        self.append(QuestionEvent::DownvotedBy(DownvotedBy { user_id }))
    }

    /// Question title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Question body text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Profile that asked the question
    pub fn asked_by_id(&self) -> Uuid {
        self.asked_by_id
    }

    /// When the question was asked
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Current lifecycle state
    pub fn state(&self) -> QuestionState {
        self.state
    }

    /// Identity of the selected answer, set only in the `Answered` state
    pub fn selected_answer_id(&self) -> Option<Uuid> {
        self.selected_answer_id
    }

    /// Answers posted on this question, indexed by identity
    pub fn answers(&self) -> &HashMap<Uuid, Answer> {
        &self.answers
    }

    /// Look up an answer by identity
    pub fn answer(&self, answer_id: Uuid) -> Option<&Answer> {
        self.answers.get(&answer_id)
    }

    /// Question-level comments, in post order
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Attached tag names
    pub fn tags(&self) -> &HashSet<String> {
        &self.tags
    }

    /// The active vote of one user, if any
    pub fn rating_of(&self, user_id: Uuid) -> Option<i8> {
        self.ratings.get(&user_id).copied()
    }

    /// Sum of all active votes
    pub fn rating(&self) -> i64 {
        self.ratings.values().map(|v| i64::from(*v)).sum()
    }

    fn toggle_vote(&mut self, user_id: Uuid, direction: i8) {
        match self.ratings.get(&user_id) {
            Some(current) if *current == direction => {
                self.ratings.remove(&user_id);
            }
            _ => {
                self.ratings.insert(user_id, direction);
            }
        }
    }

    fn ensure_created(&self, event: &QuestionEvent) -> DomainResult<()> {
        use crate::events::DomainEvent;

        if self.created_at.is_none() {
            return Err(DomainError::UnsupportedEvent(
                event.event_type().to_string(),
            ));
        }
        Ok(())
    }
}

impl AggregateRoot for Question {
    const AGGREGATE_TYPE: &'static str = "Question";
    type Event = QuestionEvent;

    fn empty() -> Self {
        Self {
            id: Uuid::nil(),
            title: String::new(),
            text: String::new(),
            asked_by_id: Uuid::nil(),
            created_at: None,
            state: QuestionState::default(),
            selected_answer_id: None,
            answers: HashMap::new(),
            comments: Vec::new(),
            tags: HashSet::new(),
            ratings: HashMap::new(),
            journal: Journal::new(),
        }
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn journal(&self) -> &Journal<QuestionEvent> {
        &self.journal
    }

    fn journal_mut(&mut self) -> &mut Journal<QuestionEvent> {
        &mut self.journal
    }

    fn when(&mut self, event: &QuestionEvent) -> DomainResult<()> {
        use crate::events::DomainEvent;

        match event {
            QuestionEvent::QuestionCreated(e) => {
                if self.created_at.is_some() {
                    return Err(DomainError::UnsupportedEvent(
                        event.event_type().to_string(),
                    ));
                }
                self.id = e.id;
                self.title = e.title.clone();
                self.text = e.text.clone();
                self.asked_by_id = e.asked_by_id;
                self.created_at = Some(e.created_at);
                self.state = QuestionState::Unapproved;
            }
            QuestionEvent::TitleUpdated(e) => {
                self.ensure_created(event)?;
                self.title = e.title.clone();
            }
            QuestionEvent::TextUpdated(e) => {
                self.ensure_created(event)?;
                self.text = e.text.clone();
            }
            QuestionEvent::QuestionApproved(_) => {
                self.ensure_created(event)?;
                self.state = self.state.transition(&QuestionTrigger::Approve)?;
            }
            QuestionEvent::AnswerAdded(e) => {
                self.ensure_created(event)?;
                self.answers.insert(
                    e.answer_id,
                    Answer {
                        id: e.answer_id,
                        text: e.text.clone(),
                        answered_by_id: e.answered_by_id,
                        created_at: e.created_at,
                        comments: Vec::new(),
                    },
                );
            }
            QuestionEvent::QuestionAnswered(e) => {
                self.ensure_created(event)?;
                if !self.answers.contains_key(&e.answer_id) {
                    return Err(DomainError::AnswerNotFound(e.answer_id));
                }
                self.state = self.state.transition(&QuestionTrigger::Answer)?;
                self.selected_answer_id = Some(e.answer_id);
            }
            QuestionEvent::CommentAdded(e) => {
                self.ensure_created(event)?;
                self.comments.push(Comment {
                    id: e.comment_id,
                    text: e.text.clone(),
                    commented_by_id: e.commented_by_id,
                    created_at: e.created_at,
                });
            }
            QuestionEvent::CommentAddedToAnswer(e) => {
                self.ensure_created(event)?;
                let answer = self
                    .answers
                    .get_mut(&e.answer_id)
                    .ok_or(DomainError::AnswerNotFound(e.answer_id))?;
                answer.comments.push(Comment {
                    id: e.comment_id,
                    text: e.text.clone(),
                    commented_by_id: e.commented_by_id,
                    created_at: e.created_at,
                });
            }
            QuestionEvent::AnswerTextUpdated(e) => {
                self.ensure_created(event)?;
                let answer = self
                    .answers
                    .get_mut(&e.answer_id)
                    .ok_or(DomainError::AnswerNotFound(e.answer_id))?;
                answer.text = e.text.clone();
            }
            QuestionEvent::TagAdded(e) => {
                self.ensure_created(event)?;
                self.tags.insert(e.name.clone());
            }
            QuestionEvent::TagRemoved(e) => {
                self.ensure_created(event)?;
                self.tags.remove(&e.name);
            }
            QuestionEvent::UpvotedBy(e) => {
                self.ensure_created(event)?;
                self.toggle_vote(e.user_id, 1);
            }
            QuestionEvent::DownvotedBy(e) => {
                self.ensure_created(event)?;
                self.toggle_vote(e.user_id, -1);
            }
        }

        Ok(())
    }

    fn event_registry() -> EventTypeRegistry<QuestionEvent> {
        QuestionEvent::registry()
    }
}

fn non_blank(value: &str, field: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidArgument(format!(
            "{field} must not be blank"
        )));
    }
    Ok(())
}
