//! Caller-facing operations, independent of the HTTP layer.

pub mod practice;
pub mod preferences;
pub mod questions;
