//! Preferences endpoints

use axum::{extract::State, Extension, Json};

use crate::error::Result;
use crate::models::{UpdatePreferencesRequest, UserPreferences};
use crate::routes::auth::AuthenticatedUser;
use crate::services::preferences;
use crate::AppState;

/// GET /api/preferences
pub async fn get(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<Json<UserPreferences>> {
    let prefs = state.with_repo(|repo| preferences::get_preferences(repo, user.id))?;
    Ok(Json(prefs))
}

/// PUT /api/preferences
pub async fn update(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(request): Json<UpdatePreferencesRequest>,
) -> Result<Json<UserPreferences>> {
    let prefs =
        state.with_repo(|repo| preferences::update_preferences(repo, user.id, &request))?;
    Ok(Json(prefs))
}
