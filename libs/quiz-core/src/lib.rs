//! Core quiz practice engine shared by the backend and import tooling.
//!
//! Provides:
//! - Answer verification per question kind (trim + lowercase normalization)
//! - Choice shuffling for presentation
//! - Next-question prioritization over a user's answer history
//! - Streak and per-category accuracy aggregation
//! - Validation of question drafts and bulk imports
//! - Shared types (Question, ProgressEntry, DerivedStats, etc.)

pub mod error;
pub mod import;
pub mod matching;
pub mod selection;
pub mod shuffle;
pub mod stats;
pub mod types;

pub use error::{SelectionParseError, ValidationError};
pub use import::{validate_batch, validate_draft, AnswerInput, ImportPlan, ImportReport, QuestionDraft};
pub use matching::{normalize, parse_selection, verify, verify_answer};
pub use selection::{prioritize, summarize_history, QuestionHistory};
pub use shuffle::{shuffle_choices, shuffle_for_presentation};
pub use stats::{aggregate, current_streak};
pub use types::{
    CategoryStat, DerivedStats, Difficulty, ModerationStatus, NewProgressEntry, NewQuestion,
    ProgressEntry, Question, QuestionKind,
};
