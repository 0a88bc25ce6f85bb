//! Streak and accuracy aggregation over a user's answer history.

use std::collections::HashMap;

use crate::types::{CategoryStat, DerivedStats, ProgressEntry};

/// Number of most recent answers inspected when computing the streak.
pub const STREAK_LOOKBACK: usize = 50;

/// Count consecutive correct answers from the most recent one backward,
/// inspecting at most [`STREAK_LOOKBACK`] outcomes.
pub fn current_streak<I>(outcomes_recent_first: I) -> usize
where
    I: IntoIterator<Item = bool>,
{
    outcomes_recent_first
        .into_iter()
        .take(STREAK_LOOKBACK)
        .take_while(|correct| *correct)
        .count()
}

/// Fold a user's full progress history into derived statistics.
///
/// `categories` maps question ids to their category. Entries whose question
/// has no category mapping still count toward the totals but not toward any
/// category.
pub fn aggregate(
    total_questions: usize,
    entries: &[ProgressEntry],
    categories: &HashMap<i64, String>,
) -> DerivedStats {
    let answered = entries.len();
    let correct = entries.iter().filter(|e| e.is_correct).count();
    let accuracy = if answered > 0 {
        correct as f64 / answered as f64
    } else {
        0.0
    };

    let mut recent_first: Vec<&ProgressEntry> = entries.iter().collect();
    recent_first.sort_by(|a, b| {
        b.answered_at
            .cmp(&a.answered_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    let streak = current_streak(recent_first.iter().map(|e| e.is_correct));

    let mut by_category = std::collections::BTreeMap::new();
    for entry in entries {
        if let Some(category) = categories.get(&entry.question_id) {
            let stat: &mut CategoryStat = by_category.entry(category.clone()).or_default();
            stat.answered += 1;
            if entry.is_correct {
                stat.correct += 1;
            }
        }
    }

    DerivedStats {
        total_questions,
        answered,
        correct,
        accuracy,
        streak,
        categories: by_category,
    }
}
