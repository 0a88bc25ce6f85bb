//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext wrapping an in-memory SQLite database and the real router
//! - Helpers for creating users and seeding questions
//! - Authentication helpers

pub mod fixtures;

use axum::http::HeaderValue;
use axum::Router;
use axum_test::TestServer;

use quiz_backend::db::{QuestionRepository, UserRepository};
use quiz_backend::models::{ModerationStatus, Question, User, UserRole};
use quiz_backend::{build_router, AppState};
use quiz_core::NewQuestion;

/// Test context containing the shared state and the router under test.
pub struct TestContext {
    pub state: AppState,
    app: Router,
}

impl TestContext {
    /// Create a new test context backed by a fresh in-memory database.
    pub fn new() -> Self {
        let repository = quiz_backend::db::SqliteRepository::open_in_memory()
            .expect("Failed to open in-memory database");
        let state = AppState::new(repository);
        let app = build_router(state.clone());
        Self { state, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Start a test server over the router.
    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).expect("Failed to start test server")
    }

    /// Create a user with the given role and return it (token included).
    pub fn create_user(&self, name: &str, role: UserRole) -> User {
        self.state
            .with_repo(|repo| Ok(repo.create_user(name, role)?))
            .expect("Failed to create test user")
    }

    /// Insert a question directly, bypassing the API.
    pub fn seed_question(&self, question: &NewQuestion, created_by: i64, status: ModerationStatus) -> Question {
        self.state
            .with_repo(|repo| Ok(repo.create_question(question, created_by, status)?))
            .expect("Failed to seed question")
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", token)).expect("Invalid token header")
    }
}
