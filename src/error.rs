//! Error types for the store and HTTP layers.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised by the JSON-backed stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already exists: {0}")]
    DuplicateUsername(String),

    #[error(transparent)]
    Persist(#[from] anyhow::Error),
}

/// Errors a handler can answer with. Each one becomes a plain-text response.
///
/// A missing session is not represented here: the session guard redirects
/// instead. Neither is a missing or foreign item on delete, which is ignored.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid username or password.")]
    AuthFailure,

    #[error("This username is already registered.")]
    Conflict,

    #[error("{0}")]
    Validation(String),

    /// A malformed or oversized multipart body; keeps axum's status.
    #[error("{}", .0.body_text())]
    Upload(#[from] MultipartError),

    #[error("Add at least one item to each category to build an outfit (missing: {}).", .missing.join(", "))]
    InsufficientItems { missing: Vec<&'static str> },

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername(_) => AppError::Conflict,
            StoreError::Persist(e) => AppError::Internal(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::AuthFailure => StatusCode::UNAUTHORIZED,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upload(e) => e.status(),
            AppError::InsufficientItems { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "request failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error.".to_string(),
                )
                    .into_response();
            }
        };

        (status, self.to_string()).into_response()
    }
}
