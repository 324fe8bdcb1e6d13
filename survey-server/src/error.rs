//! HTTP error mapping for survey-server

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use survey_common::validation::ValidationError;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Submitted data violates a survey or reply rule (422)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No valid session (401)
    #[error("not authenticated")]
    Unauthenticated,

    /// Bad credentials (401); never says which part was wrong
    #[error("Login failed. Incorrect username and/or password")]
    LoginFailed,

    /// Authenticated but not the owner (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Survey, reply or admin missing (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// A create failed in storage (503)
    #[error("Storage unavailable: {0}")]
    StorageWrite(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Map a storage error raised while writing
    pub fn write_failed(err: survey_common::Error) -> Self {
        match err {
            survey_common::Error::NotFound(what) => ApiError::NotFound(what),
            other => ApiError::StorageWrite(other.to_string()),
        }
    }
}

/// Errors raised while reading map to 404/401/500
impl From<survey_common::Error> for ApiError {
    fn from(err: survey_common::Error) -> Self {
        match err {
            survey_common::Error::NotFound(what) => ApiError::NotFound(what),
            survey_common::Error::LoginFailed => ApiError::LoginFailed,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Unparseable JSON bodies are reported like any other invalid field
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(ValidationError::new("body", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "errors": [err] }),
            ),
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "not authenticated" }),
            ),
            ApiError::LoginFailed => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": ApiError::LoginFailed.to_string() }),
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::StorageWrite(msg) => {
                error!("Storage write failed: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": "storage unavailable" }),
                )
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::Validation(ValidationError::new("title", "empty")), 422),
            (ApiError::Unauthenticated, 401),
            (ApiError::LoginFailed, 401),
            (ApiError::Forbidden("survey 1".into()), 403),
            (ApiError::NotFound("survey 1".into()), 404),
            (ApiError::StorageWrite("disk full".into()), 503),
            (ApiError::Internal("boom".into()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status().as_u16(), status);
        }
    }

    #[test]
    fn test_common_error_mapping() {
        assert!(matches!(
            ApiError::from(survey_common::Error::NotFound("x".into())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(survey_common::Error::LoginFailed),
            ApiError::LoginFailed
        ));
        assert!(matches!(
            ApiError::from(survey_common::Error::Config("x".into())),
            ApiError::Internal(_)
        ));
        assert!(matches!(
            ApiError::write_failed(survey_common::Error::Config("x".into())),
            ApiError::StorageWrite(_)
        ));
    }
}
