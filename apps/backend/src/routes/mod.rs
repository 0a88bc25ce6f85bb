//! HTTP handlers.

pub mod auth;
pub mod preferences;
pub mod progress;
pub mod questions;
pub mod users;
