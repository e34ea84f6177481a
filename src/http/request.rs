//! Request handling and validation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Decode the inbound payload and reject empty or malformed bodies
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Payload checks run before the routing engine is engaged

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::http::{HeaderMap, HeaderValue, Request, StatusCode};
use serde_json::Value;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::routing::RoutingError;
use crate::upstream::Payload;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Issues a fresh UUID v4 for every request lacking an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request ID set by the request-id layer.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Map a body that could not be read (e.g. over the size limit).
pub fn reject_body(rejection: BytesRejection) -> RoutingError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RoutingError::InvalidRequest("Payload exceeds the maximum allowed size".into())
    } else {
        RoutingError::InvalidRequest(rejection.body_text())
    }
}

/// Decode a non-empty JSON object from a raw body.
pub fn parse_payload(body: &Bytes) -> Result<Payload, RoutingError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RoutingError::InvalidRequest("Payload cannot be empty".into()));
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => Ok(map),
        Ok(Value::Object(_)) | Ok(Value::Null) => {
            Err(RoutingError::InvalidRequest("Payload cannot be empty".into()))
        }
        Ok(_) => Err(RoutingError::InvalidRequest("Payload must be a JSON object".into())),
        Err(e) => Err(RoutingError::InvalidRequest(format!("Malformed JSON payload: {}", e))),
    }
}
