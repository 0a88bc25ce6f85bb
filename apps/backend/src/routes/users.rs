//! User registration and identity endpoints

use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::db::UserRepository;
use crate::error::{ApiError, Result};
use crate::models::{RegisterRequest, RegisterResponse, User, UserRole};
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// POST /api/users/register
/// Creates a learner account and returns its bearer token
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }

    let user = state.with_repo(|repo| Ok(repo.create_user(&name, UserRole::User)?))?;

    tracing::info!(user_id = user.id, "registered new user");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.id,
            name: user.name,
            role: user.role,
            token: user.token,
        }),
    ))
}

/// GET /api/users/me
pub async fn me(Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>) -> Json<User> {
    Json(user)
}
