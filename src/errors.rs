//! Structured error types for herald
//!
//! Uses thiserror for ergonomic error definitions with automatic Display
//! and Error trait implementations.

use thiserror::Error;

/// All possible errors in herald
#[derive(Error, Debug)]
pub enum HeraldError {
    /// Storage or socket I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Time-of-day value not in HH:MM form
    #[error("Invalid time of day '{0}'. Expected HH:MM")]
    InvalidTimeOfDay(String),

    /// Command validation failed
    #[error("Command validation failed: {0}")]
    Validation(&'static str),

    /// Daemon socket missing or not accepting connections
    #[error("Daemon unavailable at {path}: {reason}")]
    DaemonUnavailable { path: String, reason: String },

    /// Desktop notification service error
    #[error("Desktop notification error: {0}")]
    Desktop(String),
}

/// Convenience Result type using HeraldError
pub type Result<T> = std::result::Result<T, HeraldError>;

impl From<&'static str> for HeraldError {
    fn from(s: &'static str) -> Self {
        HeraldError::Validation(s)
    }
}

impl From<notify_rust::error::Error> for HeraldError {
    fn from(e: notify_rust::error::Error) -> Self {
        HeraldError::Desktop(e.to_string())
    }
}
