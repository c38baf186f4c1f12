//! Universal error handling for the API
//!
//! Every store or input failure is caught at the handler boundary and
//! converted into one of three wire shapes: 400 with a structured
//! `{message, description, code}` body, 404 with an empty body, or 500 with
//! `{"error": message}`. Nothing is allowed to crash an invocation uncaught.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use catalog_storage::catalog::CatalogStorageError;
use catalog_storage::cursor::CursorError;

use crate::book_uploads::BookUploadsError;

/// Body of a 400 validation failure
#[derive(Debug, Serialize)]
struct ValidationBody {
    message: String,
    description: String,
    code: u16,
}

/// Body of a 500 store failure
#[derive(Debug, Serialize)]
struct StoreErrorBody {
    error: String,
}

/// Application error type mapped to the API's response shapes
#[derive(Debug)]
pub enum AppError {
    /// A required filter or parameter was missing or unusable
    Validation {
        /// Short human-readable message
        message: String,
        /// Longer description of what was expected
        description: String,
    },
    /// A single-item query matched no rows
    NotFound,
    /// An underlying store operation failed
    Store(String),
}

impl AppError {
    /// Creates a validation error
    #[must_use]
    pub fn validation(message: &str, description: &str) -> Self {
        Self::Validation {
            message: message.to_string(),
            description: description.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation {
                message,
                description,
            } => {
                tracing::warn!("Validation error: {message}");
                (
                    StatusCode::BAD_REQUEST,
                    Json(ValidationBody {
                        message,
                        description,
                        code: 400,
                    }),
                )
                    .into_response()
            }
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::Store(message) => {
                tracing::error!("Store error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(StoreErrorBody { error: message }),
                )
                    .into_response()
            }
        }
    }
}

impl From<CatalogStorageError> for AppError {
    fn from(err: CatalogStorageError) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<BookUploadsError> for AppError {
    fn from(err: BookUploadsError) -> Self {
        Self::Store(err.to_string())
    }
}

/// An undecodable record id supplied by the client is that client's error
impl From<CursorError> for AppError {
    fn from(err: CursorError) -> Self {
        Self::validation(
            "bookId path parameter is not a valid book id",
            &format!("The provided bookId token could not be decoded: {err}"),
        )
    }
}
