use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::wizard::machine::WizardError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Wizard(e) => {
                let (status, code) = match e {
                    WizardError::ValidationBlocked { .. } => {
                        (StatusCode::BAD_REQUEST, "VALIDATION_BLOCKED")
                    }
                    WizardError::UnknownStep { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                    WizardError::AtBoundary { .. } | WizardError::NotFinalStep { .. } => {
                        (StatusCode::CONFLICT, "INVALID_TRANSITION")
                    }
                    WizardError::SubmissionInFlight => (StatusCode::CONFLICT, "SUBMISSION_IN_FLIGHT"),
                    WizardError::Completed => (StatusCode::CONFLICT, "WIZARD_COMPLETED"),
                    WizardError::GenerationFailed(msg) => {
                        tracing::warn!("Generation failed: {msg}");
                        (StatusCode::BAD_GATEWAY, "GENERATION_FAILED")
                    }
                };
                (status, code, e.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
