//! Practice flow: judging answers, recording them, and reading the ledger
//! back as a practice queue, statistics or per-question history.

use chrono::Utc;
use quiz_core::selection::RECENT_ATTEMPT_WINDOW;
use quiz_core::{
    aggregate, prioritize, summarize_history, verify, DerivedStats, ModerationStatus,
    NewProgressEntry, ProgressEntry, Question, QuestionHistory,
};
use tracing::debug;

use crate::db::{ProgressRepository, QuestionRepository};
use crate::error::Result;
use crate::models::User;
use crate::services::questions::visible_question;

/// Judge an answer without recording it.
pub fn check_answer(question: &Question, raw_answer: &str) -> bool {
    verify(question, raw_answer)
}

/// Judge an answer for a stored question without recording it.
pub fn check_answer_by_id<R: QuestionRepository>(
    repo: &R,
    user: &User,
    question_id: i64,
    raw_answer: &str,
) -> Result<bool> {
    let question = visible_question(repo, user, question_id)?;
    Ok(check_answer(&question, raw_answer))
}

/// Judge an answer and append it to the ledger.
pub fn record_progress<R>(
    repo: &R,
    user: &User,
    question_id: i64,
    raw_answer: &str,
    time_taken_seconds: Option<u32>,
) -> Result<ProgressEntry>
where
    R: QuestionRepository + ProgressRepository,
{
    let question = visible_question(repo, user, question_id)?;
    let is_correct = check_answer(&question, raw_answer);
    let user_id = user.id;

    let entry = repo.append_progress(&NewProgressEntry {
        user_id,
        question_id,
        user_answer: raw_answer.to_string(),
        is_correct,
        answered_at: Utc::now(),
        time_taken_seconds,
    })?;

    debug!(user_id, question_id, is_correct, "recorded progress");
    Ok(entry)
}

/// Up to `count` approved questions in practice order, choices shuffled.
///
/// `count` must already be clamped by the caller.
pub fn next_questions<R>(repo: &R, user_id: i64, count: usize) -> Result<Vec<Question>>
where
    R: QuestionRepository + ProgressRepository,
{
    let candidates = repo.get_approved_questions()?;
    let history = repo.list_progress_for_user(user_id)?;
    let summaries = summarize_history(&history);

    Ok(prioritize(candidates, &summaries, count))
}

/// Accuracy, streak and per-category counts for a user.
///
/// The question total counts approved questions, the same pool the
/// practice queue draws from.
pub fn user_stats<R>(repo: &R, user_id: i64) -> Result<DerivedStats>
where
    R: QuestionRepository + ProgressRepository,
{
    let total_questions = repo.count_questions(Some(ModerationStatus::Approved))?;
    let entries = repo.list_progress_for_user(user_id)?;
    let categories = repo.categories_answered_by(user_id)?;

    Ok(aggregate(total_questions, &entries, &categories))
}

/// A user's attempts at one question plus their summary.
pub fn question_history<R>(
    repo: &R,
    user: &User,
    question_id: i64,
    limit: Option<usize>,
    most_recent_first: bool,
) -> Result<(Vec<ProgressEntry>, QuestionHistory)>
where
    R: QuestionRepository + ProgressRepository,
{
    visible_question(repo, user, question_id)?;
    let user_id = user.id;

    let entries =
        repo.list_progress_for_user_question(user_id, question_id, limit, most_recent_first)?;
    let recent = repo.list_progress_for_user_question(
        user_id,
        question_id,
        Some(RECENT_ATTEMPT_WINDOW),
        true,
    )?;
    let recent: Vec<&ProgressEntry> = recent.iter().collect();

    Ok((entries, QuestionHistory::from_recent_first(&recent)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteRepository;
    use crate::error::ApiError;
    use crate::models::UserRole;
    use pretty_assertions::assert_eq;
    use quiz_core::{Difficulty, NewQuestion, QuestionKind};

    fn repo() -> SqliteRepository {
        SqliteRepository::open_in_memory().unwrap()
    }

    fn learner(id: i64) -> User {
        User {
            id,
            name: format!("learner-{}", id),
            role: UserRole::User,
            token: format!("token-{}", id),
            created_at: Utc::now(),
            last_seen_at: Utc::now(),
        }
    }

    fn add_question(repo: &SqliteRepository, prompt: &str, answer: &str, status: ModerationStatus) -> Question {
        let new = NewQuestion {
            category: "Institutions".to_string(),
            prompt: prompt.to_string(),
            kind: QuestionKind::OpenText,
            choices: vec![],
            answer: answer.to_string(),
            keywords: vec![],
            difficulty: Difficulty::Medium,
        };
        repo.create_question(&new, 1, status).unwrap()
    }

    #[test]
    fn test_record_progress_judges_answer() {
        let repo = repo();
        let q = add_question(&repo, "Capital?", "Paris", ModerationStatus::Approved);

        let right = record_progress(&repo, &learner(5), q.id, "  paris ", Some(3)).unwrap();
        let wrong = record_progress(&repo, &learner(5), q.id, "Lyon", None).unwrap();

        assert!(right.is_correct);
        assert!(!wrong.is_correct);
        assert_eq!(right.user_answer, "  paris ");
        assert_eq!(repo.list_progress_for_user(5).unwrap().len(), 2);
    }

    #[test]
    fn test_same_answer_twice_gives_same_verdict() {
        let repo = repo();
        let q = add_question(&repo, "Capital?", "Paris", ModerationStatus::Approved);

        let first = record_progress(&repo, &learner(5), q.id, "PARIS", None).unwrap();
        let second = record_progress(&repo, &learner(5), q.id, "PARIS", None).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.is_correct, second.is_correct);
    }

    #[test]
    fn test_record_progress_unknown_question() {
        let result = record_progress(&repo(), &learner(5), 42, "x", None);
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_next_questions_prefers_unseen_then_missed() {
        let repo = repo();
        let seen_right = add_question(&repo, "A?", "a", ModerationStatus::Approved);
        let seen_wrong = add_question(&repo, "B?", "b", ModerationStatus::Approved);
        let unseen = add_question(&repo, "C?", "c", ModerationStatus::Approved);
        add_question(&repo, "D?", "d", ModerationStatus::Pending);

        record_progress(&repo, &learner(1), seen_right.id, "a", None).unwrap();
        record_progress(&repo, &learner(1), seen_wrong.id, "nope", None).unwrap();

        let next = next_questions(&repo, 1, 10).unwrap();
        let ids: Vec<i64> = next.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![unseen.id, seen_wrong.id, seen_right.id]);
    }

    #[test]
    fn test_user_stats_counts_approved_questions() {
        let repo = repo();
        let q = add_question(&repo, "A?", "a", ModerationStatus::Approved);
        add_question(&repo, "B?", "b", ModerationStatus::Approved);
        add_question(&repo, "C?", "c", ModerationStatus::Pending);

        let empty = user_stats(&repo, 9).unwrap();
        assert_eq!(empty.total_questions, 2);
        assert_eq!(empty.answered, 0);
        assert_eq!(empty.accuracy, 0.0);

        record_progress(&repo, &learner(9), q.id, "a", None).unwrap();
        record_progress(&repo, &learner(9), q.id, "x", None).unwrap();
        record_progress(&repo, &learner(9), q.id, "a", None).unwrap();

        let stats = user_stats(&repo, 9).unwrap();
        assert_eq!(stats.answered, 3);
        assert_eq!(stats.correct, 2);
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.categories["Institutions"].answered, 3);
    }

    #[test]
    fn test_question_history_summary() {
        let repo = repo();
        let q = add_question(&repo, "A?", "a", ModerationStatus::Approved);
        record_progress(&repo, &learner(2), q.id, "x", None).unwrap();
        record_progress(&repo, &learner(2), q.id, "a", None).unwrap();
        record_progress(&repo, &learner(2), q.id, "A", None).unwrap();

        let (entries, summary) = question_history(&repo, &learner(2), q.id, Some(2), false).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].is_correct);
        assert_eq!(summary.last_outcome, Some(true));
        assert_eq!(summary.recent_streak, 2);
    }

    #[test]
    fn test_hidden_question_reads_as_not_found() {
        let repo = repo();
        let pending = add_question(&repo, "Draft?", "secret", ModerationStatus::Pending);
        let outsider = learner(5);

        let recorded = record_progress(&repo, &outsider, pending.id, "secret", None);
        assert!(matches!(recorded, Err(ApiError::NotFound(_))));
        let checked = check_answer_by_id(&repo, &outsider, pending.id, "secret");
        assert!(matches!(checked, Err(ApiError::NotFound(_))));
        let history = question_history(&repo, &outsider, pending.id, None, true);
        assert!(matches!(history, Err(ApiError::NotFound(_))));
        assert!(repo.list_progress_for_user(5).unwrap().is_empty());

        // The author still practises their own draft.
        let author = learner(1);
        assert!(record_progress(&repo, &author, pending.id, "secret", None).unwrap().is_correct);
        let (entries, _) = question_history(&repo, &author, pending.id, None, true).unwrap();
        assert_eq!(entries.len(), 1);
    }
}
