use thiserror::Error;

use crate::model::{QuestionError, QuestionId};

/// Malformed question sets or out-of-range selections.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidInput {
    #[error("question set is empty")]
    EmptyQuestionSet,

    #[error("question at position {position} is invalid: {source}")]
    Question {
        position: usize,
        #[source]
        source: QuestionError,
    },

    #[error("duplicate question id: {0}")]
    DuplicateQuestionId(QuestionId),

    #[error("unknown question id: {0}")]
    UnknownQuestion(QuestionId),

    #[error("option {index} is out of range for question {question_id} ({len} options)")]
    OptionOutOfRange {
        question_id: QuestionId,
        index: usize,
        len: usize,
    },
}

/// Errors emitted by the assessment engine.
///
/// Every variant is local and recoverable; the caller decides how to
/// surface it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    #[error("question {question_id} was already answered")]
    AlreadyAnswered { question_id: QuestionId },

    #[error("question {question_id} has not been answered yet")]
    NotAnswered { question_id: QuestionId },

    #[error("explanations are revealed once the session is complete")]
    RevealLocked,

    #[error("the session time limit has expired")]
    TimeExpired,
}
