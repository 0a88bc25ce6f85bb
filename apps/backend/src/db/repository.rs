//! Repository pattern for database access.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;

use quiz_core::{
    normalize, Difficulty, ModerationStatus, NewProgressEntry, NewQuestion, ProgressEntry,
    Question, QuestionKind,
};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::db::date_utils::{now_db_timestamp, parse_db_timestamp, to_db_timestamp};
use crate::db::error::DbError;
use crate::models::{
    DifficultyPreference, ReviewMode, ThemeMode, User, UserPreferences, UserRole,
};

type Result<T> = std::result::Result<T, DbError>;

/// Content and status changes for an existing question.
#[derive(Debug, Clone)]
pub struct QuestionChanges<'a> {
    pub content: &'a NewQuestion,
    /// New moderation status, if the editor may and does change it.
    pub status: Option<ModerationStatus>,
    pub changed_by: i64,
}

/// Result of an edit.
#[derive(Debug, Clone)]
pub struct QuestionUpdate {
    pub question: Question,
    /// Progress rows discarded because the canonical answer changed.
    pub progress_cleared: usize,
}

/// Repository for question operations.
pub trait QuestionRepository {
    fn get_question(&self, id: i64) -> Result<Option<Question>>;
    fn get_approved_questions(&self) -> Result<Vec<Question>>;
    fn get_all_questions(&self) -> Result<Vec<Question>>;
    /// Approved questions plus the user's own pending ones.
    fn get_visible_questions(&self, user_id: i64) -> Result<Vec<Question>>;
    fn count_questions(&self, status: Option<ModerationStatus>) -> Result<usize>;
    /// Category of every question the user has answered at least once.
    fn categories_answered_by(&self, user_id: i64) -> Result<HashMap<i64, String>>;
    fn create_question(
        &self,
        question: &NewQuestion,
        created_by: i64,
        status: ModerationStatus,
    ) -> Result<Question>;
    /// Apply an edit. When the stored answer differs from the new one, every
    /// progress row for the question is deleted in the same transaction.
    fn update_question(&self, id: i64, changes: &QuestionChanges<'_>) -> Result<QuestionUpdate>;
    /// Stamp a moderation decision on a question.
    fn set_question_status(
        &self,
        id: i64,
        status: ModerationStatus,
        reviewer: i64,
    ) -> Result<Question>;
    /// Delete a question and its progress. Returns the number of progress rows removed.
    fn delete_question(&self, id: i64) -> Result<usize>;
    /// Insert a validated batch in one transaction.
    fn import_questions(
        &self,
        questions: &[NewQuestion],
        created_by: i64,
        status: ModerationStatus,
    ) -> Result<Vec<i64>>;
    /// Normalized prompts of every stored question.
    fn existing_prompts(&self) -> Result<HashSet<String>>;
}

/// Repository for the append-only answer ledger.
pub trait ProgressRepository {
    fn append_progress(&self, entry: &NewProgressEntry) -> Result<ProgressEntry>;
    fn get_progress(&self, id: i64) -> Result<Option<ProgressEntry>>;
    /// All of a user's entries, most recent first.
    fn list_progress_for_user(&self, user_id: i64) -> Result<Vec<ProgressEntry>>;
    fn list_progress_for_user_question(
        &self,
        user_id: i64,
        question_id: i64,
        limit: Option<usize>,
        most_recent_first: bool,
    ) -> Result<Vec<ProgressEntry>>;
}

/// Repository for user operations.
pub trait UserRepository {
    fn create_user(&self, name: &str, role: UserRole) -> Result<User>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_token(&self, token: &str) -> Result<Option<User>>;
    fn update_last_seen(&self, user_id: i64) -> Result<()>;
    /// Create or re-role the user bearing `token`.
    fn ensure_user_with_token(&self, name: &str, role: UserRole, token: &str) -> Result<User>;
}

/// Repository for per-user practice preferences.
pub trait PreferencesRepository {
    /// Stored preferences, or `None` when the user never changed them.
    fn get_preferences(&self, user_id: i64) -> Result<Option<UserPreferences>>;
    /// Insert or replace the user's preferences.
    fn save_preferences(&self, prefs: &UserPreferences) -> Result<UserPreferences>;
}

/// SQLite implementation of repositories.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(super::schema::SCHEMA)?;
        Ok(())
    }

    fn query_questions<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Question>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, QuestionRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(QuestionRow::into_question).collect()
    }

    fn fetch_question(conn: &Connection, id: i64) -> Result<Option<Question>> {
        let sql = format!("SELECT {} FROM questions WHERE id = ?1", QUESTION_COLUMNS);
        conn.query_row(&sql, params![id], QuestionRow::from_row)
            .optional()?
            .map(QuestionRow::into_question)
            .transpose()
    }

    fn insert_question(
        conn: &Connection,
        question: &NewQuestion,
        created_by: i64,
        status: ModerationStatus,
        now: &str,
    ) -> Result<i64> {
        let (approved_by, approved_at) = if status == ModerationStatus::Approved {
            (Some(created_by), Some(now))
        } else {
            (None, None)
        };

        conn.execute(
            "INSERT INTO questions (category, question, question_type, choices, answer, keywords, difficulty,
                                    created_by, status, approved_by, approved_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
            params![
                question.category,
                question.prompt,
                question.kind.as_str(),
                encode_list(&question.choices)?,
                question.answer,
                encode_list(&question.keywords)?,
                question.difficulty.as_str(),
                created_by,
                status.as_str(),
                approved_by,
                approved_at,
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn query_progress<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<ProgressEntry>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, ProgressRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(ProgressRow::into_entry).collect()
    }

    fn query_user<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Option<User>> {
        self.conn
            .query_row(sql, params, UserRow::from_row)
            .optional()?
            .map(UserRow::into_user)
            .transpose()
    }
}

const QUESTION_COLUMNS: &str = "id, category, question, question_type, choices, answer, keywords, difficulty, \
     created_by, status, approved_by, approved_at, created_at, updated_at";

const PROGRESS_COLUMNS: &str =
    "id, user_id, question_id, user_answer, is_correct, answered_at, time_taken_seconds";

const USER_COLUMNS: &str = "id, name, role, token, created_at, last_seen_at";

const PREFERENCES_COLUMNS: &str = "user_id, practice_session_length, difficulty_preference, \
     category_preference, review_mode, auto_advance_timing_open, auto_advance_timing_choice, \
     question_randomization, skip_answered_questions, focus_weak_areas, theme_mode, \
     stats_visibility, interface_language, updated_at";

impl QuestionRepository for SqliteRepository {
    fn get_question(&self, id: i64) -> Result<Option<Question>> {
        Self::fetch_question(&self.conn, id)
    }

    fn get_approved_questions(&self) -> Result<Vec<Question>> {
        let sql = format!(
            "SELECT {} FROM questions WHERE status = 'approved' ORDER BY id",
            QUESTION_COLUMNS
        );
        Self::query_questions(&self.conn, &sql, [])
    }

    fn get_all_questions(&self) -> Result<Vec<Question>> {
        let sql = format!("SELECT {} FROM questions ORDER BY id", QUESTION_COLUMNS);
        Self::query_questions(&self.conn, &sql, [])
    }

    fn get_visible_questions(&self, user_id: i64) -> Result<Vec<Question>> {
        let sql = format!(
            "SELECT {} FROM questions
             WHERE status = 'approved' OR (status = 'pending' AND created_by = ?1)
             ORDER BY id",
            QUESTION_COLUMNS
        );
        Self::query_questions(&self.conn, &sql, params![user_id])
    }

    fn count_questions(&self, status: Option<ModerationStatus>) -> Result<usize> {
        let count: i64 = match status {
            Some(status) => self.conn.query_row(
                "SELECT COUNT(*) FROM questions WHERE status = ?1",
                params![status.as_str()],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))?,
        };
        Ok(count as usize)
    }

    fn categories_answered_by(&self, user_id: i64) -> Result<HashMap<i64, String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT q.id, q.category
             FROM questions q
             JOIN progress p ON p.question_id = q.id
             WHERE p.user_id = ?1",
        )?;
        let categories = stmt
            .query_map(params![user_id], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;
        Ok(categories)
    }

    fn create_question(
        &self,
        question: &NewQuestion,
        created_by: i64,
        status: ModerationStatus,
    ) -> Result<Question> {
        let id = Self::insert_question(&self.conn, question, created_by, status, &now_db_timestamp())?;
        debug!(question_id = id, status = status.as_str(), "created question");
        Self::fetch_question(&self.conn, id)?.ok_or(DbError::QuestionNotFound(id))
    }

    fn update_question(&self, id: i64, changes: &QuestionChanges<'_>) -> Result<QuestionUpdate> {
        let start = Instant::now();
        let tx = self.conn.unchecked_transaction()?;

        let current = Self::fetch_question(&tx, id)?.ok_or(DbError::QuestionNotFound(id))?;
        let content = changes.content;
        let now = now_db_timestamp();

        let status = changes.status.unwrap_or(current.status);
        let (approved_by, approved_at) =
            if status == ModerationStatus::Approved && current.status != ModerationStatus::Approved {
                (Some(changes.changed_by), Some(now.clone()))
            } else {
                (current.approved_by, current.approved_at.map(to_db_timestamp))
            };

        tx.execute(
            "UPDATE questions
             SET category = ?1, question = ?2, question_type = ?3, choices = ?4, answer = ?5,
                 keywords = ?6, difficulty = ?7, status = ?8, approved_by = ?9, approved_at = ?10,
                 updated_at = ?11
             WHERE id = ?12",
            params![
                content.category,
                content.prompt,
                content.kind.as_str(),
                encode_list(&content.choices)?,
                content.answer,
                encode_list(&content.keywords)?,
                content.difficulty.as_str(),
                status.as_str(),
                approved_by,
                approved_at,
                now,
                id,
            ],
        )?;

        let progress_cleared = if current.answer != content.answer {
            tx.execute("DELETE FROM progress WHERE question_id = ?1", params![id])?
        } else {
            0
        };

        let question = Self::fetch_question(&tx, id)?.ok_or(DbError::QuestionNotFound(id))?;
        tx.commit()?;

        if progress_cleared > 0 {
            info!(question_id = id, progress_cleared, "answer changed, cleared progress");
        }
        debug!(question_id = id, elapsed = ?start.elapsed(), "updated question");

        Ok(QuestionUpdate {
            question,
            progress_cleared,
        })
    }

    fn set_question_status(
        &self,
        id: i64,
        status: ModerationStatus,
        reviewer: i64,
    ) -> Result<Question> {
        let now = now_db_timestamp();
        let updated = self.conn.execute(
            "UPDATE questions
             SET status = ?1, approved_by = ?2, approved_at = ?3, updated_at = ?3
             WHERE id = ?4",
            params![status.as_str(), reviewer, now, id],
        )?;
        if updated == 0 {
            return Err(DbError::QuestionNotFound(id));
        }
        Self::fetch_question(&self.conn, id)?.ok_or(DbError::QuestionNotFound(id))
    }

    fn delete_question(&self, id: i64) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let progress_deleted = tx.execute("DELETE FROM progress WHERE question_id = ?1", params![id])?;
        let deleted = tx.execute("DELETE FROM questions WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(DbError::QuestionNotFound(id));
        }
        tx.commit()?;

        debug!(question_id = id, progress_deleted, "deleted question");
        Ok(progress_deleted)
    }

    fn import_questions(
        &self,
        questions: &[NewQuestion],
        created_by: i64,
        status: ModerationStatus,
    ) -> Result<Vec<i64>> {
        let start = Instant::now();
        let tx = self.conn.unchecked_transaction()?;
        let now = now_db_timestamp();

        let mut ids = Vec::with_capacity(questions.len());
        for question in questions {
            ids.push(Self::insert_question(&tx, question, created_by, status, &now)?);
        }
        tx.commit()?;

        debug!(count = ids.len(), elapsed = ?start.elapsed(), "imported questions");
        Ok(ids)
    }

    fn existing_prompts(&self) -> Result<HashSet<String>> {
        let mut stmt = self.conn.prepare("SELECT question FROM questions")?;
        let prompts = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .map(|prompt| prompt.map(|p| normalize(&p)))
            .collect::<std::result::Result<HashSet<_>, _>>()?;
        Ok(prompts)
    }
}

impl ProgressRepository for SqliteRepository {
    fn append_progress(&self, entry: &NewProgressEntry) -> Result<ProgressEntry> {
        let answered_at = to_db_timestamp(entry.answered_at);
        self.conn.execute(
            "INSERT INTO progress (user_id, question_id, user_answer, is_correct, answered_at, time_taken_seconds)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.user_id,
                entry.question_id,
                entry.user_answer,
                entry.is_correct,
                answered_at,
                entry.time_taken_seconds,
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        // Read back at storage precision.
        Ok(ProgressEntry {
            id,
            user_id: entry.user_id,
            question_id: entry.question_id,
            user_answer: entry.user_answer.clone(),
            is_correct: entry.is_correct,
            answered_at: parse_db_timestamp(&answered_at)?,
            time_taken_seconds: entry.time_taken_seconds,
        })
    }

    fn get_progress(&self, id: i64) -> Result<Option<ProgressEntry>> {
        let sql = format!("SELECT {} FROM progress WHERE id = ?1", PROGRESS_COLUMNS);
        self.conn
            .query_row(&sql, params![id], ProgressRow::from_row)
            .optional()?
            .map(ProgressRow::into_entry)
            .transpose()
    }

    fn list_progress_for_user(&self, user_id: i64) -> Result<Vec<ProgressEntry>> {
        let sql = format!(
            "SELECT {} FROM progress WHERE user_id = ?1 ORDER BY answered_at DESC, id DESC",
            PROGRESS_COLUMNS
        );
        self.query_progress(&sql, params![user_id])
    }

    fn list_progress_for_user_question(
        &self,
        user_id: i64,
        question_id: i64,
        limit: Option<usize>,
        most_recent_first: bool,
    ) -> Result<Vec<ProgressEntry>> {
        let order = if most_recent_first { "DESC" } else { "ASC" };
        let sql = format!(
            "SELECT {} FROM progress
             WHERE user_id = ?1 AND question_id = ?2
             ORDER BY answered_at {order}, id {order}
             LIMIT ?3",
            PROGRESS_COLUMNS,
            order = order
        );
        // SQLite treats a negative LIMIT as unbounded.
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        self.query_progress(&sql, params![user_id, question_id, limit])
    }
}

impl UserRepository for SqliteRepository {
    fn create_user(&self, name: &str, role: UserRole) -> Result<User> {
        let token = uuid::Uuid::new_v4().to_string();
        let now = now_db_timestamp();
        self.conn.execute(
            "INSERT INTO users (name, role, token, created_at, last_seen_at) VALUES (?1, ?2, ?3, ?4, ?4)",
            params![name, role.as_str(), token, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_user(id)?
            .ok_or_else(|| DbError::InvalidData(format!("user {} vanished after insert", id)))
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
        self.query_user(&sql, params![id])
    }

    fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE token = ?1", USER_COLUMNS);
        self.query_user(&sql, params![token])
    }

    fn update_last_seen(&self, user_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE users SET last_seen_at = ?1 WHERE id = ?2",
            params![now_db_timestamp(), user_id],
        )?;
        Ok(())
    }

    fn ensure_user_with_token(&self, name: &str, role: UserRole, token: &str) -> Result<User> {
        let now = now_db_timestamp();
        self.conn.execute(
            "INSERT INTO users (name, role, token, created_at, last_seen_at) VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(token) DO UPDATE SET role = excluded.role",
            params![name, role.as_str(), token, now],
        )?;
        self.get_user_by_token(token)?
            .ok_or_else(|| DbError::InvalidData("ensured user not found".to_string()))
    }
}

impl PreferencesRepository for SqliteRepository {
    fn get_preferences(&self, user_id: i64) -> Result<Option<UserPreferences>> {
        let sql = format!(
            "SELECT {} FROM user_preferences WHERE user_id = ?1",
            PREFERENCES_COLUMNS
        );
        self.conn
            .query_row(&sql, params![user_id], PreferencesRow::from_row)
            .optional()?
            .map(PreferencesRow::into_preferences)
            .transpose()
    }

    fn save_preferences(&self, prefs: &UserPreferences) -> Result<UserPreferences> {
        let sql = format!(
            "INSERT OR REPLACE INTO user_preferences ({})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            PREFERENCES_COLUMNS
        );
        self.conn.execute(
            &sql,
            params![
                prefs.user_id,
                prefs.practice_session_length as i64,
                prefs.difficulty_preference.as_str(),
                encode_list(&prefs.category_preference)?,
                prefs.review_mode.as_str(),
                prefs.auto_advance_timing_open,
                prefs.auto_advance_timing_choice,
                prefs.question_randomization,
                prefs.skip_answered_questions,
                prefs.focus_weak_areas,
                prefs.theme_mode.as_str(),
                prefs.stats_visibility,
                prefs.interface_language,
                to_db_timestamp(prefs.updated_at),
            ],
        )?;
        debug!(user_id = prefs.user_id, "saved preferences");

        self.get_preferences(prefs.user_id)?.ok_or_else(|| {
            DbError::InvalidData(format!("preferences for user {} vanished after save", prefs.user_id))
        })
    }
}

/// Raw question columns; decoded outside the rusqlite row callback so JSON
/// and timestamp failures surface as `DbError::InvalidData`.
struct QuestionRow {
    id: i64,
    category: String,
    prompt: String,
    kind: String,
    choices: Option<String>,
    answer: String,
    keywords: Option<String>,
    difficulty: String,
    created_by: i64,
    status: String,
    approved_by: Option<i64>,
    approved_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl QuestionRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            category: row.get(1)?,
            prompt: row.get(2)?,
            kind: row.get(3)?,
            choices: row.get(4)?,
            answer: row.get(5)?,
            keywords: row.get(6)?,
            difficulty: row.get(7)?,
            created_by: row.get(8)?,
            status: row.get(9)?,
            approved_by: row.get(10)?,
            approved_at: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }

    fn into_question(self) -> Result<Question> {
        let status = ModerationStatus::from_str(&self.status).ok_or_else(|| {
            DbError::InvalidData(format!("question {}: unknown status '{}'", self.id, self.status))
        })?;
        let difficulty = Difficulty::from_str(&self.difficulty).ok_or_else(|| {
            DbError::InvalidData(format!(
                "question {}: unknown difficulty '{}'",
                self.id, self.difficulty
            ))
        })?;

        Ok(Question {
            id: self.id,
            category: self.category,
            prompt: self.prompt,
            kind: QuestionKind::parse(&self.kind),
            choices: decode_list(self.choices.as_deref())?,
            answer: self.answer,
            keywords: decode_list(self.keywords.as_deref())?,
            difficulty,
            created_by: self.created_by,
            status,
            approved_by: self.approved_by,
            approved_at: self.approved_at.as_deref().map(parse_db_timestamp).transpose()?,
            created_at: parse_db_timestamp(&self.created_at)?,
            updated_at: parse_db_timestamp(&self.updated_at)?,
        })
    }
}

struct ProgressRow {
    id: i64,
    user_id: i64,
    question_id: i64,
    user_answer: String,
    is_correct: bool,
    answered_at: String,
    time_taken_seconds: Option<u32>,
}

impl ProgressRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            question_id: row.get(2)?,
            user_answer: row.get(3)?,
            is_correct: row.get(4)?,
            answered_at: row.get(5)?,
            time_taken_seconds: row.get(6)?,
        })
    }

    fn into_entry(self) -> Result<ProgressEntry> {
        Ok(ProgressEntry {
            id: self.id,
            user_id: self.user_id,
            question_id: self.question_id,
            user_answer: self.user_answer,
            is_correct: self.is_correct,
            answered_at: parse_db_timestamp(&self.answered_at)?,
            time_taken_seconds: self.time_taken_seconds,
        })
    }
}

struct UserRow {
    id: i64,
    name: String,
    role: String,
    token: String,
    created_at: String,
    last_seen_at: String,
}

impl UserRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            role: row.get(2)?,
            token: row.get(3)?,
            created_at: row.get(4)?,
            last_seen_at: row.get(5)?,
        })
    }

    fn into_user(self) -> Result<User> {
        let role = UserRole::from_str(&self.role)
            .ok_or_else(|| DbError::InvalidData(format!("user {}: unknown role '{}'", self.id, self.role)))?;
        Ok(User {
            id: self.id,
            name: self.name,
            role,
            token: self.token,
            created_at: parse_db_timestamp(&self.created_at)?,
            last_seen_at: parse_db_timestamp(&self.last_seen_at)?,
        })
    }
}

struct PreferencesRow {
    user_id: i64,
    practice_session_length: i64,
    difficulty_preference: String,
    category_preference: Option<String>,
    review_mode: String,
    auto_advance_timing_open: u32,
    auto_advance_timing_choice: u32,
    question_randomization: bool,
    skip_answered_questions: bool,
    focus_weak_areas: bool,
    theme_mode: String,
    stats_visibility: bool,
    interface_language: String,
    updated_at: String,
}

impl PreferencesRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get(0)?,
            practice_session_length: row.get(1)?,
            difficulty_preference: row.get(2)?,
            category_preference: row.get(3)?,
            review_mode: row.get(4)?,
            auto_advance_timing_open: row.get(5)?,
            auto_advance_timing_choice: row.get(6)?,
            question_randomization: row.get(7)?,
            skip_answered_questions: row.get(8)?,
            focus_weak_areas: row.get(9)?,
            theme_mode: row.get(10)?,
            stats_visibility: row.get(11)?,
            interface_language: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }

    fn into_preferences(self) -> Result<UserPreferences> {
        let user_id = self.user_id;
        let invalid = move |field: &str, value: &str| {
            DbError::InvalidData(format!(
                "preferences for user {}: unknown {} '{}'",
                user_id, field, value
            ))
        };
        let difficulty_preference = DifficultyPreference::from_str(&self.difficulty_preference)
            .ok_or_else(|| invalid("difficulty_preference", &self.difficulty_preference))?;
        let review_mode = ReviewMode::from_str(&self.review_mode)
            .ok_or_else(|| invalid("review_mode", &self.review_mode))?;
        let theme_mode = ThemeMode::from_str(&self.theme_mode)
            .ok_or_else(|| invalid("theme_mode", &self.theme_mode))?;

        Ok(UserPreferences {
            user_id,
            practice_session_length: self.practice_session_length.max(0) as usize,
            difficulty_preference,
            category_preference: decode_list(self.category_preference.as_deref())?,
            review_mode,
            auto_advance_timing_open: self.auto_advance_timing_open,
            auto_advance_timing_choice: self.auto_advance_timing_choice,
            question_randomization: self.question_randomization,
            skip_answered_questions: self.skip_answered_questions,
            focus_weak_areas: self.focus_weak_areas,
            theme_mode,
            stats_visibility: self.stats_visibility,
            interface_language: self.interface_language,
            updated_at: parse_db_timestamp(&self.updated_at)?,
        })
    }
}

fn encode_list(items: &[String]) -> Result<String> {
    serde_json::to_string(items).map_err(|e| DbError::InvalidData(e.to_string()))
}

fn decode_list(raw: Option<&str>) -> Result<Vec<String>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| DbError::InvalidData(format!("bad list column '{}': {}", raw, e))),
    }
}
