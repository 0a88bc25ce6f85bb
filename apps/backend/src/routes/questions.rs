//! Question endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::services::{practice, preferences, questions};
use crate::AppState;

/// GET /api/questions
pub async fn list(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Query(query): Query<QuestionListQuery>,
) -> Result<Json<Vec<Question>>> {
    let questions = state.with_repo(|repo| questions::list_questions(repo, &user, &query))?;
    Ok(Json(questions))
}

/// POST /api/questions
pub async fn create(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(draft): Json<QuestionDraft>,
) -> Result<(StatusCode, Json<Question>)> {
    let question = state.with_repo(|repo| questions::create_question(repo, &user, &draft))?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// GET /api/questions/next?count=
/// Without `count`, the user's preferred session length applies
pub async fn next(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Query(query): Query<NextQuestionsQuery>,
) -> Result<Json<Vec<Question>>> {
    let questions = state.with_repo(|repo| {
        let count = preferences::session_length(repo, user.id, query.count)?;
        practice::next_questions(repo, user.id, count)
    })?;
    Ok(Json(questions))
}

/// POST /api/questions/import
/// 201 when at least one question was imported, 200 otherwise
pub async fn import(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(payload): Json<ImportRequest>,
) -> Result<(StatusCode, Json<ImportReport>)> {
    let report =
        state.with_repo(|repo| questions::import_questions(repo, &user, &payload.questions))?;

    let status = if report.imported_questions > 0 {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(report)))
}

/// GET /api/questions/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<Question>> {
    let question = state.with_repo(|repo| questions::get_question(repo, &user, id))?;
    Ok(Json(question))
}

/// PUT /api/questions/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(draft): Json<QuestionDraft>,
) -> Result<Json<QuestionUpdateResponse>> {
    let update = state.with_repo(|repo| questions::update_question(repo, &user, id, &draft))?;
    Ok(Json(QuestionUpdateResponse {
        question: update.question,
        progress_cleared: update.progress_cleared,
    }))
}

/// DELETE /api/questions/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.with_repo(|repo| questions::delete_question(repo, &user, id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/questions/:id/check
/// Judges an answer without recording it
pub async fn check(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(payload): Json<CheckAnswerRequest>,
) -> Result<Json<CheckAnswerResponse>> {
    let is_correct =
        state.with_repo(|repo| practice::check_answer_by_id(repo, &user, id, &payload.answer))?;

    Ok(Json(CheckAnswerResponse {
        question_id: id,
        is_correct,
    }))
}

/// POST /api/questions/:id/review
pub async fn review(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<Question>> {
    let question =
        state.with_repo(|repo| questions::review_question(repo, &user, id, payload.action))?;
    Ok(Json(question))
}
