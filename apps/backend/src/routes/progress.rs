//! Progress endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::services::practice;
use crate::AppState;

/// POST /api/progress
pub async fn record(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(payload): Json<RecordProgressRequest>,
) -> Result<(StatusCode, Json<ProgressEntry>)> {
    let entry = state.with_repo(|repo| {
        practice::record_progress(
            repo,
            &user,
            payload.question_id,
            &payload.user_answer,
            payload.time_taken_seconds,
        )
    })?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/progress/stats
pub async fn stats(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<Json<DerivedStats>> {
    let stats = state.with_repo(|repo| practice::user_stats(repo, user.id))?;
    Ok(Json(stats))
}

/// GET /api/progress/history/:question_id?limit=&order=
pub async fn history(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(question_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>> {
    let most_recent_first = query.order == HistoryOrder::Desc;
    let (entries, summary) = state.with_repo(|repo| {
        practice::question_history(repo, &user, question_id, query.limit, most_recent_first)
    })?;

    Ok(Json(HistoryResponse {
        question_id,
        summary,
        entries,
    }))
}
