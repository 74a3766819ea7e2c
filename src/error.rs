//! Error types for Retention Assist.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Narrative error: {0}")]
    Narrative(#[from] NarrativeError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Conversation session errors. These are client errors, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No active session for student {student_id}")]
    UnknownSession { student_id: String },

    #[error("Assessment for student {student_id} is already complete")]
    AlreadyComplete { student_id: String },
}

/// Narrative text-service errors. Always recovered locally via fallback.
#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("Narrative service request failed: {0}")]
    RequestFailed(String),

    #[error("Narrative service timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response from narrative service: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
