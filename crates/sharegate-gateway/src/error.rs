use crate::model::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sharegate_core::ShareError;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Errors of the owner-facing API.
///
/// The public resolution endpoint never produces these; it answers every
/// failure with the same `404` body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing or unknown credentials")]
    Unauthenticated,
    #[error("invalid request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Share(#[from] ShareError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Share(ShareError::Validation(message)) => {
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::Share(ShareError::Authorization(message)) => {
                (StatusCode::FORBIDDEN, message)
            }
            AppError::Share(ShareError::NotFound(id)) => {
                (StatusCode::NOT_FOUND, format!("share link not found: {id}"))
            }
            AppError::Share(ShareError::Persistence(source)) => {
                error!(error = %source, "share link store failure");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "share link store is unavailable".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
