//! Next-question prioritization.
//!
//! Builds a practice queue that front-loads questions the user has never
//! attempted, then those whose latest attempt was wrong, then the ones
//! attempted longest ago.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::shuffle::shuffle_for_presentation;
use crate::types::{ModerationStatus, ProgressEntry, Question};

/// Number of most recent attempts inspected for a question's recent streak.
pub const RECENT_ATTEMPT_WINDOW: usize = 10;

/// Summary of one user's attempts at one question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuestionHistory {
    /// Correctness of the most recent attempt.
    pub last_outcome: Option<bool>,
    /// Time of the most recent attempt.
    pub last_answered_at: Option<DateTime<Utc>>,
    /// Leading run of correct answers within the most recent attempts.
    /// Not part of the ordering.
    pub recent_streak: usize,
}

impl QuestionHistory {
    /// Summarize attempts ordered most recent first.
    pub fn from_recent_first(attempts: &[&ProgressEntry]) -> Self {
        let Some(latest) = attempts.first() else {
            return Self::default();
        };

        Self {
            last_outcome: Some(latest.is_correct),
            last_answered_at: Some(latest.answered_at),
            recent_streak: attempts
                .iter()
                .take(RECENT_ATTEMPT_WINDOW)
                .take_while(|e| e.is_correct)
                .count(),
        }
    }
}

/// Group a user's progress entries by question and summarize each group.
///
/// Entries may arrive in any order; ties on timestamp resolve by entry id.
pub fn summarize_history(entries: &[ProgressEntry]) -> HashMap<i64, QuestionHistory> {
    let mut by_question: HashMap<i64, Vec<&ProgressEntry>> = HashMap::new();
    for entry in entries {
        by_question.entry(entry.question_id).or_default().push(entry);
    }

    by_question
        .into_iter()
        .map(|(question_id, mut attempts)| {
            attempts.sort_by(|a, b| {
                b.answered_at
                    .cmp(&a.answered_at)
                    .then_with(|| b.id.cmp(&a.id))
            });
            (question_id, QuestionHistory::from_recent_first(&attempts))
        })
        .collect()
}

/// Composite sort key, ascending.
///
/// `None` timestamps sort before every real timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PriorityKey {
    answered: bool,
    last_correct: bool,
    last_answered_at: Option<DateTime<Utc>>,
}

impl PriorityKey {
    pub fn for_history(history: Option<&QuestionHistory>) -> Self {
        match history.and_then(|h| h.last_outcome.map(|outcome| (outcome, h.last_answered_at))) {
            Some((last_correct, last_answered_at)) => Self {
                answered: true,
                last_correct,
                last_answered_at,
            },
            None => Self {
                answered: false,
                last_correct: false,
                last_answered_at: None,
            },
        }
    }

    pub fn is_unseen(&self) -> bool {
        !self.answered
    }

    pub fn is_missed(&self) -> bool {
        self.answered && !self.last_correct
    }
}

/// Pick up to `count` approved questions in practice order, with presented
/// choices shuffled for choice-based kinds.
pub fn prioritize(
    candidates: Vec<Question>,
    histories: &HashMap<i64, QuestionHistory>,
    count: usize,
) -> Vec<Question> {
    let mut ranked: Vec<(PriorityKey, Question)> = candidates
        .into_iter()
        .filter(|q| q.status == ModerationStatus::Approved)
        .map(|q| (PriorityKey::for_history(histories.get(&q.id)), q))
        .collect();

    ranked.sort_by_key(|(key, _)| *key);

    let mut seen = HashSet::new();
    let mut unseen = 0usize;
    let mut missed = 0usize;
    let mut selected = Vec::with_capacity(count.min(ranked.len()));

    for (key, mut question) in ranked {
        if selected.len() == count {
            break;
        }
        if !seen.insert(question.id) {
            continue;
        }
        if key.is_unseen() {
            unseen += 1;
        } else if key.is_missed() {
            missed += 1;
        }
        shuffle_for_presentation(&mut question);
        selected.push(question);
    }

    debug!(
        selected = selected.len(),
        never_answered = unseen,
        last_incorrect = missed,
        "prioritized practice questions"
    );

    selected
}
