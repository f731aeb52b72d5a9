use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Rejection raised before any audit step runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a valid URL to audit")]
    EmptyTarget,

    #[error("Invalid URL '{url}': {reason}")]
    InvalidTarget { url: String, reason: String },

    #[error("Please select at least one audit type")]
    NoAuditTypes,
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("An audit is already running")]
    AlreadyRunning,

    #[error("No completed audit available")]
    NoResult,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuditError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuditError::Validation(_) => StatusCode::BAD_REQUEST,
            AuditError::AlreadyRunning => StatusCode::CONFLICT,
            AuditError::NoResult => StatusCode::NOT_FOUND,
            AuditError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuditError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}
