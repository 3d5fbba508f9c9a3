//! HR Bridge — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hrbridge_core::error::BridgeError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `BridgeError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub BridgeError);

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            BridgeError::EventNotFound(_) => (StatusCode::NOT_FOUND, "event_not_found"),
            BridgeError::CaseNotFound(_) => (StatusCode::NOT_FOUND, "case_not_found"),
            BridgeError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            BridgeError::InvalidTransition { .. } => (StatusCode::CONFLICT, "invalid_transition"),
            BridgeError::InvalidState { .. } => (StatusCode::CONFLICT, "invalid_state"),
            BridgeError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_failure"),
            BridgeError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_failure"),
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use hrbridge_core::event::EventStatus;
    use uuid::Uuid;

    fn status_of(err: BridgeError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn test_event_not_found_maps_to_404() {
        assert_eq!(
            status_of(BridgeError::EventNotFound(Uuid::new_v4())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_case_not_found_maps_to_404() {
        assert_eq!(
            status_of(BridgeError::CaseNotFound("HRSR-WORK-1".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            status_of(BridgeError::Validation("bad input".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_invalid_transition_maps_to_409() {
        assert_eq!(
            status_of(BridgeError::InvalidTransition {
                id: Uuid::new_v4(),
                from: EventStatus::Completed,
                to: EventStatus::Processing,
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_invalid_state_maps_to_409() {
        assert_eq!(
            status_of(BridgeError::InvalidState {
                id: Uuid::new_v4(),
                status: EventStatus::Received,
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_upstream_maps_to_502() {
        assert_eq!(
            status_of(BridgeError::Upstream("timeout".into())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_storage_maps_to_500() {
        assert_eq!(
            status_of(BridgeError::Storage("db down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
