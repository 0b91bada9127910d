use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::render::pdf::RenderError;

/// Failures raised by the layout and question-generation core.
/// All of them are caller-facing validation failures; none is retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DrillError {
    #[error("Invalid layout configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported digit count {0}; expected 1, 2 or 3")]
    InvalidDigitCount(u8),

    #[error("Cell ({row}, {column}) is outside the {rows}x{columns} grid")]
    IndexOutOfBounds {
        row: u32,
        column: u32,
        rows: u32,
        columns: u32,
    },

    #[error("No valid {operator} question found after {attempts} attempts ({digits_a} digit(s) by {digits_b} digit(s))")]
    GenerationExhausted {
        operator: String,
        digits_a: u8,
        digits_b: u8,
        attempts: u32,
    },
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Drill(#[from] DrillError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Drill(e @ DrillError::GenerationExhausted { .. }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                e.to_string(),
            ),
            AppError::Drill(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "The worksheet could not be rendered".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
