//! API errors and their HTTP mapping.
//!
//! Every error body is `{"error": "...", "req_id": "..."}`. Internal errors never
//! expose their detail to the caller; it is logged instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::RequestId;

pub const TECHNICAL_ERROR: &str = "Something went wrong. Please try again later...";
pub const DOCS_MISSING_ERROR: &str = "docs required.";
pub const TEXT_MISSING_ERROR: &str = "text required.";
pub const READING_ERROR: &str = "error in reading the document.";

#[derive(Debug)]
pub enum ApiError {
    /// Rejected at the boundary (400).
    BadRequest { message: String, request_id: RequestId },
    /// Unknown resource (404).
    NotFound { message: String, request_id: RequestId },
    /// Anything unexpected (500). `detail` is logged, not returned.
    Internal { detail: String, request_id: RequestId },
}

impl ApiError {
    pub fn bad_request(request_id: &RequestId, message: impl Into<String>) -> Self {
        ApiError::BadRequest { message: message.into(), request_id: request_id.clone() }
    }

    pub fn not_found(request_id: &RequestId, message: impl Into<String>) -> Self {
        ApiError::NotFound { message: message.into(), request_id: request_id.clone() }
    }

    pub fn internal(request_id: &RequestId, detail: impl ToString) -> Self {
        ApiError::Internal { detail: detail.to_string(), request_id: request_id.clone() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, request_id) = match self {
            ApiError::BadRequest { message, request_id } => (StatusCode::BAD_REQUEST, message, request_id),
            ApiError::NotFound { message, request_id } => (StatusCode::NOT_FOUND, message, request_id),
            ApiError::Internal { detail, request_id } => {
                tracing::error!(request_id = %request_id.0, %detail, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, TECHNICAL_ERROR.to_string(), request_id)
            }
        };
        (status, Json(json!({ "error": message, "req_id": request_id.0 }))).into_response()
    }
}
