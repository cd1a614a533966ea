//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

/// Errors surfaced by the training and scoring operations.
///
/// Malformed individual log lines are deliberately not represented here:
/// log tails are expected to contain noise, and unparseable records are
/// skipped by the event decoder rather than failing the call.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The log source could not be opened or read. Aborts the call; no
    /// partial result is produced.
    #[error("log source unavailable: {0}")]
    LogSource(String),

    /// Too few qualifying samples to train. The previously trained model,
    /// if any, is left untouched.
    #[error("not enough samples: {got} (<{need})")]
    InsufficientData { got: usize, need: usize },

    /// Scoring requested with no in-memory model and no persisted artifact.
    #[error("model not trained")]
    ModelNotTrained,

    /// The tail contained zero parseable, relevant events.
    #[error("no events found")]
    NoQualifyingEvents,

    /// Unexpected server-side failure (model persistence and the like).
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::LogSource(_)
            | AppError::InsufficientData { .. }
            | AppError::ModelNotTrained
            | AppError::NoQualifyingEvents => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        let body = Json(json!({
            "ok": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}
