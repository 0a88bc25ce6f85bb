//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Re-export shared types from quiz-core
pub use quiz_core::{
    DerivedStats, ImportReport, ModerationStatus, ProgressEntry, Question, QuestionDraft,
    QuestionHistory,
};

/// Default number of questions served by `/api/questions/next`.
pub const DEFAULT_PRACTICE_COUNT: usize = 10;

/// Largest accepted `count` for `/api/questions/next`.
pub const MAX_PRACTICE_COUNT: usize = 50;

/// Clamp a requested practice batch size. Values outside 1..=50 (or absent)
/// fall back to the default.
pub fn practice_count(requested: Option<i64>) -> usize {
    match requested {
        Some(n) if n >= 1 && n <= MAX_PRACTICE_COUNT as i64 => n as usize,
        _ => DEFAULT_PRACTICE_COUNT,
    }
}

// === Users ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Moderator,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "moderator" => Some(Self::Moderator),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Admins and moderators may edit any question and change its status.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Moderator | Self::Admin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub role: UserRole,
    #[serde(skip_serializing)]
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub name: String,
    pub role: UserRole,
    pub token: String,
}

// === Questions ===

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionListQuery {
    pub category: Option<String>,
    pub status: Option<ModerationStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NextQuestionsQuery {
    pub count: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportRequest {
    pub questions: Vec<QuestionDraft>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub action: ReviewAction,
}

/// Result of an edit: the stored question plus how many progress rows the
/// edit discarded because the canonical answer changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionUpdateResponse {
    #[serde(flatten)]
    pub question: Question,
    pub progress_cleared: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckAnswerRequest {
    #[serde(alias = "user_answer")]
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckAnswerResponse {
    pub question_id: i64,
    pub is_correct: bool,
}

// === Progress ===

#[derive(Debug, Clone, Deserialize)]
pub struct RecordProgressRequest {
    pub question_id: i64,
    #[serde(alias = "answer")]
    pub user_answer: String,
    pub time_taken_seconds: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
    #[serde(default)]
    pub order: HistoryOrder,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub question_id: i64,
    pub summary: QuestionHistory,
    pub entries: Vec<ProgressEntry>,
}

// === Preferences ===

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyPreference {
    Easy,
    Medium,
    Hard,
    #[default]
    Adaptive,
    Mixed,
}

impl DifficultyPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Adaptive => "adaptive",
            Self::Mixed => "mixed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            "adaptive" => Some(Self::Adaptive),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewMode {
    #[default]
    Immediate,
    EndOfSession,
}

impl ReviewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::EndOfSession => "end_of_session",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "immediate" => Some(Self::Immediate),
            "end_of_session" => Some(Self::EndOfSession),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

/// Accepted range for auto-advance on open questions, in milliseconds.
pub const AUTO_ADVANCE_OPEN_MS: std::ops::RangeInclusive<u32> = 5_000..=300_000;

/// Accepted range for auto-advance on choice questions, in milliseconds.
pub const AUTO_ADVANCE_CHOICE_MS: std::ops::RangeInclusive<u32> = 3_000..=180_000;

/// Per-user practice preferences. Users without a stored row get the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub user_id: i64,
    pub practice_session_length: usize,
    pub difficulty_preference: DifficultyPreference,
    /// Empty means every category.
    #[serde(default)]
    pub category_preference: Vec<String>,
    pub review_mode: ReviewMode,
    pub auto_advance_timing_open: u32,
    pub auto_advance_timing_choice: u32,
    pub question_randomization: bool,
    pub skip_answered_questions: bool,
    pub focus_weak_areas: bool,
    pub theme_mode: ThemeMode,
    pub stats_visibility: bool,
    pub interface_language: String,
    pub updated_at: DateTime<Utc>,
}

impl UserPreferences {
    pub fn defaults(user_id: i64) -> Self {
        Self {
            user_id,
            practice_session_length: DEFAULT_PRACTICE_COUNT,
            difficulty_preference: DifficultyPreference::default(),
            category_preference: Vec::new(),
            review_mode: ReviewMode::default(),
            auto_advance_timing_open: 60_000,
            auto_advance_timing_choice: 30_000,
            question_randomization: false,
            skip_answered_questions: false,
            focus_weak_areas: true,
            theme_mode: ThemeMode::default(),
            stats_visibility: true,
            interface_language: "fr".to_string(),
            updated_at: Utc::now(),
        }
    }
}

/// Partial preferences update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub practice_session_length: Option<usize>,
    pub difficulty_preference: Option<DifficultyPreference>,
    pub category_preference: Option<Vec<String>>,
    pub review_mode: Option<ReviewMode>,
    pub auto_advance_timing_open: Option<u32>,
    pub auto_advance_timing_choice: Option<u32>,
    pub question_randomization: Option<bool>,
    pub skip_answered_questions: Option<bool>,
    pub focus_weak_areas: Option<bool>,
    pub theme_mode: Option<ThemeMode>,
    pub stats_visibility: Option<bool>,
    pub interface_language: Option<String>,
}
