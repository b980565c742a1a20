//! Response bodies
//!
//! Route handlers answer with an [`Envelope`]:
//! `{"status": "success", "data": ...}` or `{"status": "error", "message": ...}`.
//!
//! Action endpoints answer with an [`ActionResult`] instead:
//! `{"success": true, "data": ...}` or `{"success": false, "data": null, "error": ...}`,
//! always with HTTP 200.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use super::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope<T> {
    Success { data: T },
    Error { message: String },
}

/// 200 with a success envelope
pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope::Success { data })
}

/// 201 with a success envelope
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::CREATED, ok(data))
}

#[derive(Debug, Serialize)]
pub struct ActionResult<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ActionResult<T> {
    pub fn ok(data: Option<T>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn fail(err: ApiError) -> Self {
        let (status, message) = err.parts();
        tracing::debug!(%status, %message, "action failed");
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

impl<T> From<Result<Option<T>, ApiError>> for ActionResult<T> {
    fn from(result: Result<Option<T>, ApiError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e),
        }
    }
}

impl<T: Serialize> IntoResponse for ActionResult<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthError;
    use serde_json::json;

    #[test]
    fn success_envelope_shape() {
        let value = serde_json::to_value(Envelope::Success { data: json!({"viewCount": 3}) }).unwrap();
        assert_eq!(value, json!({"status": "success", "data": {"viewCount": 3}}));
    }

    #[test]
    fn error_envelope_shape() {
        let value = serde_json::to_value(Envelope::<()>::Error {
            message: "post not found".into(),
        })
        .unwrap();
        assert_eq!(value, json!({"status": "error", "message": "post not found"}));
    }

    #[test]
    fn action_success_without_data_serializes_null() {
        let value = serde_json::to_value(ActionResult::<u32>::ok(None)).unwrap();
        assert_eq!(value, json!({"success": true, "data": null}));
    }

    #[test]
    fn action_failure_carries_error() {
        let result: ActionResult<u32> = Err(ApiError::from(AuthError::UserNotFound)).into();
        let value = serde_json::to_value(result).unwrap();
        assert_eq!(
            value,
            json!({"success": false, "data": null, "error": "user not found"})
        );
    }
}
