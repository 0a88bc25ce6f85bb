pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::{Arc, Mutex};

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::{SqliteRepository, UserRepository};
use crate::error::ApiError;
use crate::models::UserRole;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<Mutex<SqliteRepository>>,
}

impl AppState {
    pub fn new(repository: SqliteRepository) -> Self {
        Self {
            repository: Arc::new(Mutex::new(repository)),
        }
    }

    /// Run a synchronous repository operation under the connection lock.
    /// The guard never lives across an await point.
    pub fn with_repo<T, F>(&self, f: F) -> error::Result<T>
    where
        F: FnOnce(&SqliteRepository) -> error::Result<T>,
    {
        let repo = self
            .repository
            .lock()
            .map_err(|_| ApiError::Internal("repository lock poisoned".to_string()))?;
        f(&repo)
    }
}

/// Build the full router with protected routes.
pub fn build_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        // User routes
        .route("/api/users/me", get(routes::users::me))
        // Preferences
        .route(
            "/api/preferences",
            get(routes::preferences::get).put(routes::preferences::update),
        )
        // Question routes
        .route(
            "/api/questions",
            get(routes::questions::list).post(routes::questions::create),
        )
        .route("/api/questions/next", get(routes::questions::next))
        .route("/api/questions/import", post(routes::questions::import))
        .route(
            "/api/questions/:id",
            get(routes::questions::get)
                .put(routes::questions::update)
                .delete(routes::questions::delete),
        )
        .route("/api/questions/:id/check", post(routes::questions::check))
        .route("/api/questions/:id/review", post(routes::questions::review))
        // Progress routes
        .route("/api/progress", post(routes::progress::record))
        .route("/api/progress/stats", get(routes::progress::stats))
        .route(
            "/api/progress/history/:question_id",
            get(routes::progress::history),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/users/register", post(routes::users::register))
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(path = %config.db_path, "Opening database...");
    let repository = SqliteRepository::open(&config.db_path)?;

    if let Some(token) = config.admin_token.as_deref() {
        let admin = repository.ensure_user_with_token("admin", UserRole::Admin, token)?;
        tracing::info!(user_id = admin.id, "Admin user ready");
    }

    let app = build_router(AppState::new(repository));

    let addr = config.server_address();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
