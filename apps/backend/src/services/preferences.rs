//! Practice preferences.

use chrono::Utc;
use tracing::info;

use crate::db::PreferencesRepository;
use crate::error::{ApiError, Result};
use crate::models::{
    practice_count, UpdatePreferencesRequest, UserPreferences, AUTO_ADVANCE_CHOICE_MS,
    AUTO_ADVANCE_OPEN_MS, MAX_PRACTICE_COUNT,
};

/// Stored preferences, or the defaults for a user who never changed them.
pub fn get_preferences<R: PreferencesRepository>(repo: &R, user_id: i64) -> Result<UserPreferences> {
    Ok(repo
        .get_preferences(user_id)?
        .unwrap_or_else(|| UserPreferences::defaults(user_id)))
}

/// Batch size for the practice queue: the requested count when given,
/// otherwise the user's session length.
pub fn session_length<R: PreferencesRepository>(
    repo: &R,
    user_id: i64,
    requested: Option<i64>,
) -> Result<usize> {
    match requested {
        Some(_) => Ok(practice_count(requested)),
        None => {
            let prefs = get_preferences(repo, user_id)?;
            Ok(practice_count(Some(prefs.practice_session_length as i64)))
        }
    }
}

fn validate(request: &UpdatePreferencesRequest) -> Result<()> {
    if let Some(length) = request.practice_session_length {
        if !(1..=MAX_PRACTICE_COUNT).contains(&length) {
            return Err(ApiError::BadRequest(format!(
                "practice_session_length must be between 1 and {}",
                MAX_PRACTICE_COUNT
            )));
        }
    }
    if let Some(ms) = request.auto_advance_timing_open {
        if !AUTO_ADVANCE_OPEN_MS.contains(&ms) {
            return Err(ApiError::BadRequest(format!(
                "auto_advance_timing_open must be between {} and {} milliseconds",
                AUTO_ADVANCE_OPEN_MS.start(),
                AUTO_ADVANCE_OPEN_MS.end()
            )));
        }
    }
    if let Some(ms) = request.auto_advance_timing_choice {
        if !AUTO_ADVANCE_CHOICE_MS.contains(&ms) {
            return Err(ApiError::BadRequest(format!(
                "auto_advance_timing_choice must be between {} and {} milliseconds",
                AUTO_ADVANCE_CHOICE_MS.start(),
                AUTO_ADVANCE_CHOICE_MS.end()
            )));
        }
    }
    if let Some(language) = &request.interface_language {
        if language.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "interface_language must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}

/// Apply a partial update. Absent fields keep their current value; an empty
/// category list means every category.
pub fn update_preferences<R: PreferencesRepository>(
    repo: &R,
    user_id: i64,
    request: &UpdatePreferencesRequest,
) -> Result<UserPreferences> {
    validate(request)?;
    let mut current = get_preferences(repo, user_id)?;

    if let Some(length) = request.practice_session_length {
        current.practice_session_length = length;
    }
    if let Some(difficulty) = request.difficulty_preference {
        current.difficulty_preference = difficulty;
    }
    if let Some(categories) = &request.category_preference {
        current.category_preference = categories
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
    }
    if let Some(mode) = request.review_mode {
        current.review_mode = mode;
    }
    if let Some(ms) = request.auto_advance_timing_open {
        current.auto_advance_timing_open = ms;
    }
    if let Some(ms) = request.auto_advance_timing_choice {
        current.auto_advance_timing_choice = ms;
    }
    if let Some(flag) = request.question_randomization {
        current.question_randomization = flag;
    }
    if let Some(flag) = request.skip_answered_questions {
        current.skip_answered_questions = flag;
    }
    if let Some(flag) = request.focus_weak_areas {
        current.focus_weak_areas = flag;
    }
    if let Some(theme) = request.theme_mode {
        current.theme_mode = theme;
    }
    if let Some(flag) = request.stats_visibility {
        current.stats_visibility = flag;
    }
    if let Some(language) = &request.interface_language {
        current.interface_language = language.trim().to_string();
    }
    current.updated_at = Utc::now();

    let saved = repo.save_preferences(&current)?;
    info!(user_id, session_length = saved.practice_session_length, "preferences updated");
    Ok(saved)
}
