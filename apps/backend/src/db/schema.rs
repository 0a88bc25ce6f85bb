//! SQLite schema definitions.

/// Complete schema for the quiz database.
pub const SCHEMA: &str = r#"
-- Users resolved from bearer tokens
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'moderator', 'admin')),
    token TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    last_seen_at TEXT NOT NULL
);

-- Questions
CREATE TABLE IF NOT EXISTS questions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category TEXT NOT NULL,
    question TEXT NOT NULL,
    question_type TEXT NOT NULL DEFAULT 'open_text',
    choices TEXT NOT NULL DEFAULT '[]',
    answer TEXT NOT NULL,
    keywords TEXT NOT NULL DEFAULT '[]',
    difficulty TEXT NOT NULL DEFAULT 'medium',
    created_by INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    approved_by INTEGER,
    approved_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Append-only answer ledger
CREATE TABLE IF NOT EXISTS progress (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    question_id INTEGER NOT NULL REFERENCES questions(id),
    user_answer TEXT NOT NULL,
    is_correct INTEGER NOT NULL,
    answered_at TEXT NOT NULL,
    time_taken_seconds INTEGER
);

-- Practice preferences, one row per user once changed
CREATE TABLE IF NOT EXISTS user_preferences (
    user_id INTEGER PRIMARY KEY,
    practice_session_length INTEGER NOT NULL DEFAULT 10,
    difficulty_preference TEXT NOT NULL DEFAULT 'adaptive'
        CHECK (difficulty_preference IN ('easy', 'medium', 'hard', 'adaptive', 'mixed')),
    category_preference TEXT NOT NULL DEFAULT '[]',
    review_mode TEXT NOT NULL DEFAULT 'immediate' CHECK (review_mode IN ('immediate', 'end_of_session')),
    auto_advance_timing_open INTEGER NOT NULL DEFAULT 60000,
    auto_advance_timing_choice INTEGER NOT NULL DEFAULT 30000,
    question_randomization INTEGER NOT NULL DEFAULT 0,
    skip_answered_questions INTEGER NOT NULL DEFAULT 0,
    focus_weak_areas INTEGER NOT NULL DEFAULT 1,
    theme_mode TEXT NOT NULL DEFAULT 'system' CHECK (theme_mode IN ('light', 'dark', 'system')),
    stats_visibility INTEGER NOT NULL DEFAULT 1,
    interface_language TEXT NOT NULL DEFAULT 'fr',
    updated_at TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_questions_status ON questions(status);
CREATE INDEX IF NOT EXISTS idx_questions_category ON questions(category);
CREATE INDEX IF NOT EXISTS idx_progress_user ON progress(user_id, answered_at);
CREATE INDEX IF NOT EXISTS idx_progress_user_question ON progress(user_id, question_id, answered_at);
CREATE INDEX IF NOT EXISTS idx_progress_question ON progress(question_id);
"#;
