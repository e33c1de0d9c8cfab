//! HTTP error handling and response types.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::ApiResponse;
use crate::db::repository::RepositoryError;
use crate::models::ValidationError;

/// Message for request bodies that are not JSON.
pub const INVALID_JSON_BODY: &str = "Invalid JSON body";
/// Message for path ids that are not integers.
pub const INVALID_PRODUCT_ID: &str = "Invalid product id";

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request input (400)
    Validation(String),
    /// Resource not found (404)
    NotFound(String),
    /// Store failure (500). Only `message` reaches the client; `source` is logged.
    Store {
        message: &'static str,
        source: RepositoryError,
    },
}

impl AppError {
    /// Adapter for `map_err` that tags a repository error with the public message.
    pub fn store(message: &'static str) -> impl FnOnce(RepositoryError) -> AppError {
        move |source| AppError::Store { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Validation(msg) | AppError::NotFound(msg) => msg,
            AppError::Store { message, source } => {
                tracing::error!(error = %source, retryable = source.is_retryable(), "{}", message);
                message.to_string()
            }
        };

        (status, Json(ApiResponse::failure(message))).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.message().to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "rejected request body");
        AppError::Validation(INVALID_JSON_BODY.to_string())
    }
}
