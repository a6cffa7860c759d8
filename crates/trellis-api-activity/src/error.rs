//! Error types for the activity API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use trellis_activity::ActivityError;

/// Errors returned by activity API handlers.
#[derive(Debug, Error)]
pub enum ActivityApiError {
    /// Activity entry not found.
    #[error("Activity entry not found")]
    NotFound,

    /// Invalid query parameter.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Store read failed.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response format for API errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl From<ActivityError> for ActivityApiError {
    fn from(err: ActivityError) -> Self {
        ActivityApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ActivityApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ActivityApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "not_found",
                "Activity entry not found".to_string(),
            ),
            ActivityApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            ActivityApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = ActivityApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_maps_to_400() {
        let response =
            ActivityApiError::Validation("bad activity_type".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_maps_to_500_and_hides_detail() {
        let response = ActivityApiError::Internal("db exploded".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_store_error_converts_to_internal() {
        let err: ActivityApiError = ActivityError::Store("boom".to_string()).into();
        assert!(matches!(err, ActivityApiError::Internal(_)));
    }
}
