//! Finite State Machine Abstractions
//!
//! Generic, pure state machine types for modeling aggregate lifecycles,
//! plus the Question lifecycle machine built on them.
//!
//! All transitions are deterministic functions with no side effects: the
//! full transition table is an exhaustive `match` over `(state, trigger)`
//! pairs, and every pair outside the table is rejected with
//! [`TransitionError::InvalidTransition`].

use thiserror::Error;

/// Result of a state transition
pub type TransitionResult<S> = Result<S, TransitionError>;

/// Errors that can occur during state transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The trigger is not permitted in the current state
    #[error("trigger '{trigger}' is not permitted in state '{from}'")]
    InvalidTransition { from: String, trigger: String },
}

/// Trait for finite state machines
///
/// Implement this trait to define a lifecycle with typed states and
/// triggers. `transition` is pure: the current state is not consumed and no
/// output escapes besides the next state.
pub trait StateMachine: Sized + Clone {
    /// Trigger type that drives transitions
    type Trigger;

    /// Attempt a transition from the current state.
    ///
    /// Returns the next state, or [`TransitionError::InvalidTransition`]
    /// when the `(state, trigger)` pair is not in the transition table.
    fn transition(&self, trigger: &Self::Trigger) -> TransitionResult<Self>;

    /// Check whether a trigger is permitted without performing it
    fn can_transition(&self, trigger: &Self::Trigger) -> bool {
        self.transition(trigger).is_ok()
    }
}

/// Lifecycle phase of a question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum QuestionState {
    /// Initial state. Not yet reviewed, not shown publicly.
    #[default]
    Unapproved,

    /// Approved by a moderator. Shown publicly, no selected answer.
    Approved,

    /// The author marked the question as answered.
    Answered,
}

impl QuestionState {
    /// State name for logging and error messages
    pub fn name(&self) -> &'static str {
        match self {
            QuestionState::Unapproved => "Unapproved",
            QuestionState::Approved => "Approved",
            QuestionState::Answered => "Answered",
        }
    }
}

impl std::fmt::Display for QuestionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Triggers that drive the question lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionTrigger {
    /// Moderator reviewed and approved the question
    Approve,

    /// Author selected an answer
    Answer,

    /// Author rejected the selected answer, back to approved
    CancelAnswer,
}

impl QuestionTrigger {
    /// Trigger name for logging and error messages
    pub fn name(&self) -> &'static str {
        match self {
            QuestionTrigger::Approve => "Approve",
            QuestionTrigger::Answer => "Answer",
            QuestionTrigger::CancelAnswer => "CancelAnswer",
        }
    }
}

impl std::fmt::Display for QuestionTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl StateMachine for QuestionState {
    type Trigger = QuestionTrigger;

    fn transition(&self, trigger: &Self::Trigger) -> TransitionResult<Self> {
        use QuestionState::*;
        use QuestionTrigger::*;

        match (self, trigger) {
            (Unapproved, Approve) => Ok(Approved),
            (Approved, Answer) => Ok(Answered),
            (Answered, CancelAnswer) => Ok(Approved),

            _ => Err(TransitionError::InvalidTransition {
                from: self.name().to_string(),
                trigger: trigger.name().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_initial_state_is_unapproved() {
        assert_eq!(QuestionState::default(), QuestionState::Unapproved);
    }

    #[test_case(QuestionState::Unapproved, QuestionTrigger::Approve => QuestionState::Approved)]
    #[test_case(QuestionState::Approved, QuestionTrigger::Answer => QuestionState::Answered)]
    #[test_case(QuestionState::Answered, QuestionTrigger::CancelAnswer => QuestionState::Approved)]
    fn test_permitted_transitions(state: QuestionState, trigger: QuestionTrigger) -> QuestionState {
        state.transition(&trigger).unwrap()
    }

    #[test_case(QuestionState::Unapproved, QuestionTrigger::Answer)]
    #[test_case(QuestionState::Unapproved, QuestionTrigger::CancelAnswer)]
    #[test_case(QuestionState::Approved, QuestionTrigger::Approve)]
    #[test_case(QuestionState::Approved, QuestionTrigger::CancelAnswer)]
    #[test_case(QuestionState::Answered, QuestionTrigger::Approve)]
    #[test_case(QuestionState::Answered, QuestionTrigger::Answer)]
    fn test_rejected_transitions(state: QuestionState, trigger: QuestionTrigger) {
        let err = state.transition(&trigger).unwrap_err();
        assert_eq!(
            err,
            TransitionError::InvalidTransition {
                from: state.name().to_string(),
                trigger: trigger.name().to_string(),
            }
        );
        // State value is unchanged by a rejected trigger
        assert!(!state.can_transition(&trigger));
    }

    #[test]
    fn test_answered_cycles_back_to_approved() {
        let state = QuestionState::Answered
            .transition(&QuestionTrigger::CancelAnswer)
            .unwrap();
        assert_eq!(state, QuestionState::Approved);
        // From Approved the question can be answered again
        assert!(state.can_transition(&QuestionTrigger::Answer));
    }
}
