use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Every failure an operation can report. Expected conditions carry a
/// caller-facing message; `Internal` covers everything else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskerError {
    /// Malformed input: empty or numeric usernames, bad UUIDs, unknown statuses.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate username, or a duplicate task name for the same user.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl TaskerError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    pub fn status_text(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "400 Bad Request",
            Self::NotFound(_) => "404 Not Found",
            Self::Conflict(_) => "409 Conflict",
            Self::Internal(_) => "500 Internal Server Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::Internal(msg) => msg,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.message().to_string(),
            status: self.status_text().to_string(),
        }
    }
}

/// Anything not already classified is an internal failure. The cause is
/// logged here and kept out of the caller-facing message.
impl From<anyhow::Error> for TaskerError {
    fn from(err: anyhow::Error) -> Self {
        error!("Unexpected failure: {:#}", err);
        Self::Internal("An unexpected error occurred.".to_string())
    }
}

/// Rendered form of a [`TaskerError`]: `{"error": ..., "status": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: String,
}
