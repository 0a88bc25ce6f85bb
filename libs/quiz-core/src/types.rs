//! Core types for the quiz practice engine.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Question kind, which selects the answer comparison rule.
///
/// Stored and serialized as its snake_case tag. Tags that are not one of the
/// four known kinds survive a round trip as `Unrecognized` so rows written by
/// older or foreign tooling can still be read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionKind {
    OpenText,
    MultipleChoice,
    TrueFalse,
    MultipleSelect,
    Unrecognized(String),
}

impl Default for QuestionKind {
    fn default() -> Self {
        Self::OpenText
    }
}

impl QuestionKind {
    /// All kinds accepted on create and import.
    pub const KNOWN: [QuestionKind; 4] = [
        Self::OpenText,
        Self::MultipleChoice,
        Self::TrueFalse,
        Self::MultipleSelect,
    ];

    /// Get the kind tag as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::OpenText => "open_text",
            Self::MultipleChoice => "multiple_choice",
            Self::TrueFalse => "true_false",
            Self::MultipleSelect => "multiple_select",
            Self::Unrecognized(tag) => tag,
        }
    }

    /// Parse a tag, tolerating surrounding whitespace and case.
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "open_text" => Self::OpenText,
            "multiple_choice" => Self::MultipleChoice,
            "true_false" => Self::TrueFalse,
            "multiple_select" => Self::MultipleSelect,
            _ => Self::Unrecognized(tag.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    /// Whether questions of this kind carry a list of presentable choices.
    pub fn has_choices(&self) -> bool {
        matches!(self, Self::MultipleChoice | Self::MultipleSelect)
    }
}

impl From<String> for QuestionKind {
    fn from(tag: String) -> Self {
        Self::parse(&tag)
    }
}

impl From<QuestionKind> for String {
    fn from(kind: QuestionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moderation lifecycle state of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Difficulty label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Medium
    }
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

/// A stored question.
///
/// `answer` holds the canonical answer. For `multiple_select` it is a JSON
/// array of strings; for every other kind it is a single string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub category: String,
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(rename = "question_type")]
    pub kind: QuestionKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    pub answer: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub difficulty: Difficulty,
    pub created_by: i64,
    pub status: ModerationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated question draft, ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub category: String,
    pub prompt: String,
    pub kind: QuestionKind,
    pub choices: Vec<String>,
    pub answer: String,
    pub keywords: Vec<String>,
    pub difficulty: Difficulty,
}

/// One recorded attempt at a question. Never updated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub id: i64,
    pub user_id: i64,
    pub question_id: i64,
    pub user_answer: String,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_taken_seconds: Option<u32>,
}

/// A judged attempt that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProgressEntry {
    pub user_id: i64,
    pub question_id: i64,
    pub user_answer: String,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
    pub time_taken_seconds: Option<u32>,
}

/// Per-category answer counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub answered: usize,
    pub correct: usize,
}

/// Statistics derived from a user's full answer history. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub total_questions: usize,
    pub answered: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub streak: usize,
    pub categories: BTreeMap<String, CategoryStat>,
}
