//! Application error type and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::db::RepositoryError;
use crate::services::CheckoutError;

/// Top-level error returned by request handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request input failed validation.
    #[error("{0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Checkout failure.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Repository(e) => repository_status(e),
            Self::Checkout(e) => match e {
                CheckoutError::InvalidQuantity
                | CheckoutError::ProductUnavailable
                | CheckoutError::InsufficientStock => StatusCode::BAD_REQUEST,
                CheckoutError::UserNotFound | CheckoutError::ProductNotFound => {
                    StatusCode::NOT_FOUND
                }
                CheckoutError::Repository(e) => repository_status(e),
            },
        }
    }
}

fn repository_status(e: &RepositoryError) -> StatusCode {
    match e {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal detail stays in the logs; clients get a generic message.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
            "internal server error".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
