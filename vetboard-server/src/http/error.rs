//! API error types with IntoResponse
//!
//! Errors become `{"status": "error", "message": ...}` with a matching HTTP
//! status. Database and internal errors are logged and replaced with a
//! generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::envelope::Envelope;
use crate::auth::AuthError;
use crate::db::DbError;
use crate::models::ValidationError;

const INTERNAL_MESSAGE: &str = "an internal error occurred";

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Bad or missing credentials (401), deactivated or non-admin caller (403)
    Auth(AuthError),

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Caller may not touch this resource (403)
    Forbidden { reason: String },

    /// Duplicate or state conflict (409)
    Conflict { message: String },

    /// Database error (500, logged)
    Database(DbError),

    /// Internal error (500, logged)
    Internal { message: String },
}

impl ApiError {
    /// Status code and the message safe to show the client.
    pub fn parts(&self) -> (StatusCode, String) {
        match self {
            Self::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::Auth(e) => {
                let status = match e {
                    AuthError::Inactive | AuthError::NotAdmin => StatusCode::FORBIDDEN,
                    _ => StatusCode::UNAUTHORIZED,
                };
                (status, e.to_string())
            }
            Self::NotFound { resource, .. } => {
                (StatusCode::NOT_FOUND, format!("{resource} not found"))
            }
            Self::Forbidden { reason } => (StatusCode::FORBIDDEN, reason.clone()),
            Self::Conflict { message } => (StatusCode::CONFLICT, message.clone()),
            Self::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.parts();
        (status, Json(Envelope::<()>::Error { message })).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Forbidden(reason) => Self::Forbidden { reason },
            DbError::Conflict(message) => Self::Conflict { message },
            DbError::Sqlx(_) => Self::Database(e),
        }
    }
}
