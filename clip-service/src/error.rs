//! Error types for clip-service.
//!
//! Every fallible operation in the crate returns [`AppError`], which is
//! translated into an HTTP status plus a JSON body at the request boundary.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Result type for clip-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed client input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing, malformed, or expired bearer token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Wrong username/password combination
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Resource absent, or owned by someone else. The two cases are
    /// deliberately indistinguishable so callers cannot probe for other
    /// users' assets.
    #[error("Not found")]
    NotFound,

    /// Duplicate resource (username already registered)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Blob store I/O failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Thumbnail extraction failed
    #[error("Thumbnail extraction failed: {0}")]
    Transcode(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Catch-all internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Storage(_)
            | AppError::Transcode(_)
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // 500-class details are logged, never surfaced to the client.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            match self {
                AppError::Storage(_) => "Storage error".to_string(),
                AppError::Transcode(_) => "Thumbnail error".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(json!({
            "error": message,
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("resource already exists".to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::Internal(format!("foreign key violation: {db_err}"))
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Storage("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Transcode("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message_carries_no_detail() {
        // Ownership mismatches and genuine absence must read identically.
        assert_eq!(AppError::NotFound.to_string(), "Not found");
    }
}
