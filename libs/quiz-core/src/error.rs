//! Error types for quiz-core.

use thiserror::Error;

/// Reasons a question draft (create, update or import item) is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("empty question text")]
    EmptyQuestion,

    #[error("empty answer")]
    EmptyAnswer,

    #[error("empty category")]
    EmptyCategory,

    #[error("invalid question type '{0}', must be one of: open_text, multiple_choice, true_false, multiple_select")]
    InvalidQuestionType(String),

    #[error("{kind} questions must have at least 2 choices")]
    InsufficientChoices { kind: String },

    #[error("answer '{0}' not found in choices")]
    AnswerNotInChoices(String),

    #[error("invalid JSON array in answer: {0}")]
    InvalidAnswerArray(String),

    #[error("empty answer array")]
    EmptyAnswerArray,

    #[error("answer '{0}' listed more than once")]
    DuplicateAnswer(String),

    #[error("invalid answer type, must be string or array of strings")]
    InvalidAnswerType,

    #[error("invalid difficulty '{0}', must be easy/medium/hard")]
    InvalidDifficulty(String),
}

/// Failure to read a multiple-select answer list.
#[derive(Debug, Error)]
pub enum SelectionParseError {
    #[error("malformed JSON selection: {0}")]
    Json(#[from] serde_json::Error),
}
