//! Error types for Shelfmark server

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::forms::FieldErrors;

/// Stable error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthenticated = 2,
    NotAuthorized = 3,
    DbFailure = 4,
    NoSuchEntity = 5,
    BadValue = 6,
    NotImplemented = 7,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Maps unique constraints to the form field they protect
const UNIQUE_CONSTRAINTS: &[(&str, &str, &str)] = &[
    ("users_username_lower_key", "username", "A user with that username already exists."),
    ("tags_name_key", "name", "A tag with that name already exists."),
    ("librarians_library_id_key", "library_id", "This library already has a librarian."),
    ("profiles_user_id_key", "user_id", "This user already has a profile."),
];

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = err {
            if db.is_unique_violation() {
                let constraint = db.constraint().unwrap_or_default();
                let (field, message) = UNIQUE_CONSTRAINTS
                    .iter()
                    .find(|(name, _, _)| *name == constraint)
                    .map(|(_, field, message)| (*field, *message))
                    .unwrap_or(("__all__", "A record with these values already exists."));
                return AppError::Validation(FieldErrors::single(field, message));
            }
            if db.is_foreign_key_violation() {
                return AppError::Validation(FieldErrors::single(
                    "__all__",
                    "Referenced record does not exist.",
                ));
            }
        }
        AppError::Database(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Field-level messages, present on validation failures only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message, fields) = match self {
            AppError::Authentication(msg) => (ErrorCode::NotAuthenticated, msg, None),
            AppError::Authorization(msg) => (ErrorCode::NotAuthorized, msg, None),
            AppError::NotFound(msg) => (ErrorCode::NoSuchEntity, msg, None),
            AppError::Validation(fields) => (
                ErrorCode::BadValue,
                "One or more fields are invalid".to_string(),
                Some(fields),
            ),
            AppError::BadRequest(msg) => (ErrorCode::BadValue, msg, None),
            AppError::NotImplemented(msg) => (ErrorCode::NotImplemented, msg, None),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (ErrorCode::DbFailure, "Database error".to_string(), None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (ErrorCode::Failure, "Internal server error".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            fields,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
