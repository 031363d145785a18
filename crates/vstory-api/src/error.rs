//! API error types.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Whether internal error details are replaced with a generic message.
/// Set once at router construction from `ApiConfig::is_production`.
static MASK_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(false);

/// Configure internal-error masking for all responses.
pub fn mask_internal_errors(enabled: bool) {
    MASK_INTERNAL_ERRORS.store(enabled, Ordering::Relaxed);
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(#[from] vstory_storage::StorageError),

    #[error("Queue error: {0}")]
    Queue(#[from] vstory_queue::QueueError),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) | ApiError::Storage(_) | ApiError::Queue(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let error = match &self {
            ApiError::Internal(_) | ApiError::Storage(_) | ApiError::Queue(_) => {
                if MASK_INTERNAL_ERRORS.load(Ordering::Relaxed) {
                    "Internal server error".to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse { error };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn error_body(err: ApiError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json["error"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_internal_details_masked_only_when_enabled() {
        // Development default: the detail passes through.
        mask_internal_errors(false);
        let (status, error) = error_body(ApiError::internal("connection pool exhausted")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.contains("connection pool exhausted"));

        // Production: generic message, client errors untouched.
        mask_internal_errors(true);
        let (_, error) = error_body(ApiError::internal("connection pool exhausted")).await;
        assert_eq!(error, "Internal server error");

        let (status, error) = error_body(ApiError::bad_request("No video files uploaded")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error.contains("No video files uploaded"));

        mask_internal_errors(false);
    }
}
