//! Property-Based Tests
//!
//! Uses proptest to verify the replay properties that must hold for every
//! event sequence an aggregate's own behavior methods can produce:
//! determinism (replay reproduces live state) and the version invariant
//! (version equals history length).

use proptest::prelude::*;
use uuid::Uuid;

use qna_domain::aggregate::Question;
use qna_domain::events::question::{DownvotedBy, QuestionEvent, UpvotedBy};
use qna_domain::AggregateRoot;

const TAG_POOL: [&str; 4] = ["rust", "sql", "nats", "event-sourcing"];

fn voter(i: usize) -> Uuid {
    Uuid::from_u128(0x1000 + (i % 3) as u128)
}

/// One behavior call against a question.
///
/// Indices select from small fixed pools so that duplicate tags, repeat
/// votes, and answer selection all actually occur in generated sequences.
#[derive(Debug, Clone)]
enum Op {
    UpdateTitle(String),
    UpdateText(String),
    Approve,
    AddAnswer(String),
    SelectAnswer(usize),
    AddComment(String),
    AddTag(usize),
    RemoveTag(usize),
    Upvote(usize),
    Downvote(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z]{1,12}".prop_map(Op::UpdateTitle),
        "[a-z]{1,12}".prop_map(Op::UpdateText),
        Just(Op::Approve),
        "[a-z]{1,12}".prop_map(Op::AddAnswer),
        (0usize..4).prop_map(Op::SelectAnswer),
        "[a-z]{1,12}".prop_map(Op::AddComment),
        (0usize..TAG_POOL.len()).prop_map(Op::AddTag),
        (0usize..TAG_POOL.len()).prop_map(Op::RemoveTag),
        (0usize..3).prop_map(Op::Upvote),
        (0usize..3).prop_map(Op::Downvote),
    ]
}

fn op_sequence() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op(), 0..40)
}

/// Apply one operation, ignoring validation rejections.
///
/// A rejected operation appends nothing, so skipping it keeps the history a
/// valid output of the behavior methods. Votes are appended as events
/// directly since the profile existence check is a boundary concern, not
/// part of replay semantics.
fn apply(question: &mut Question, op: &Op, answer_ids: &mut Vec<Uuid>) {
    let author = Uuid::from_u128(0x2000);

    match op {
        Op::UpdateTitle(s) => {
            let _ = question.update_title(s);
        }
        Op::UpdateText(s) => {
            let _ = question.update_text(s);
        }
        Op::Approve => {
            let _ = question.set_approved();
        }
        Op::AddAnswer(s) => {
            if let Ok(id) = question.add_answer(s, author) {
                answer_ids.push(id);
            }
        }
        Op::SelectAnswer(i) => {
            if !answer_ids.is_empty() {
                let _ = question.set_answered(answer_ids[i % answer_ids.len()]);
            }
        }
        Op::AddComment(s) => {
            let _ = question.add_comment(s, author);
        }
        Op::AddTag(i) => {
            let _ = question.add_tag(TAG_POOL[*i]);
        }
        Op::RemoveTag(i) => {
            let _ = question.remove_tag(TAG_POOL[*i]);
        }
        Op::Upvote(i) => {
            let _ = question.append(QuestionEvent::UpvotedBy(UpvotedBy { user_id: voter(*i) }));
        }
        Op::Downvote(i) => {
            let _ = question.append(QuestionEvent::DownvotedBy(DownvotedBy {
                user_id: voter(*i),
            }));
        }
    }
}

fn run_live(ops: &[Op]) -> Question {
    let mut question = Question::create("seed-title", "seed-text", Uuid::from_u128(0x3000))
        .expect("creation with non-blank inputs succeeds");

    let mut answer_ids = Vec::new();
    for op in ops {
        apply(&mut question, op, &mut answer_ids);
    }

    question
}

proptest! {
    /// Replay of a live-produced history reproduces the live state exactly
    #[test]
    fn prop_replay_reproduces_live_state(ops in op_sequence()) {
        let live = run_live(&ops);
        let history = live.uncommitted_events().to_vec();
        let replayed = Question::replay(history).expect("live history replays");

        prop_assert_eq!(replayed.id(), live.id());
        prop_assert_eq!(replayed.title(), live.title());
        prop_assert_eq!(replayed.text(), live.text());
        prop_assert_eq!(replayed.state(), live.state());
        prop_assert_eq!(replayed.selected_answer_id(), live.selected_answer_id());
        prop_assert_eq!(replayed.answers(), live.answers());
        prop_assert_eq!(replayed.comments(), live.comments());
        prop_assert_eq!(replayed.tags(), live.tags());
        for i in 0..3 {
            prop_assert_eq!(replayed.rating_of(voter(i)), live.rating_of(voter(i)));
        }
    }

    /// Version equals the number of events in the history, and a replayed
    /// aggregate carries no uncommitted events
    #[test]
    fn prop_version_equals_history_length(ops in op_sequence()) {
        let live = run_live(&ops);
        let history = live.uncommitted_events().to_vec();

        prop_assert_eq!(live.version(), history.len() as u64);

        let replayed = Question::replay(history.clone()).expect("live history replays");
        prop_assert_eq!(replayed.version(), history.len() as u64);
        prop_assert!(replayed.uncommitted_events().is_empty());
    }

    /// A voter's final rating depends only on their own vote sequence:
    /// same direction toggles off, opposite direction flips
    #[test]
    fn prop_vote_sequence_matches_toggle_model(directions in prop::collection::vec(any::<bool>(), 0..20)) {
        let mut question = Question::create("t", "b", Uuid::from_u128(0x3000)).unwrap();
        let user = voter(0);

        let mut model: Option<i8> = None;
        for up in &directions {
            let direction = if *up { 1 } else { -1 };
            model = match model {
                Some(current) if current == direction => None,
                _ => Some(direction),
            };

            let event = if *up {
                QuestionEvent::UpvotedBy(UpvotedBy { user_id: user })
            } else {
                QuestionEvent::DownvotedBy(DownvotedBy { user_id: user })
            };
            question.append(event).unwrap();
        }

        prop_assert_eq!(question.rating_of(user), model);
    }
}
