//! Response handling.
//!
//! # Responsibilities
//! - Map routing errors to HTTP status codes
//! - Render the `{code, message}` error envelope
//!
//! # Design Decisions
//! - Internal errors never leak their detail to the client

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::routing::RoutingError;

/// Error body returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl RoutingError {
    pub fn status(&self) -> StatusCode {
        match self {
            RoutingError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RoutingError::NoAvailableInstance(_) => StatusCode::SERVICE_UNAVAILABLE,
            RoutingError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            RoutingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RoutingError {
    fn into_response(self) -> Response {
        let message = match &self {
            RoutingError::InvalidRequest(msg)
            | RoutingError::NoAvailableInstance(msg)
            | RoutingError::Timeout(msg) => msg.clone(),
            RoutingError::Internal(detail) => {
                tracing::error!(error = %detail, "Unexpected error occurred");
                "An unexpected error occurred".to_string()
            }
        };
        let body = ErrorResponse {
            code: self.code().to_string(),
            message,
        };
        (self.status(), Json(body)).into_response()
    }
}
