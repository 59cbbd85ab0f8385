// View Error Types
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

/// Errors raised by host capabilities (lookup, save, delete) and by request
/// extraction. Messages are client-facing: the delete view serializes them
/// verbatim into its `{"error": ...}` envelope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    // 400 Bad Request
    #[error("{0}")]
    BadRequest(String),

    // 403 Forbidden
    #[error("{0}")]
    Forbidden(String),

    // 404 Not Found
    #[error("{0}")]
    NotFound(String),

    // 405 Method Not Allowed
    #[error("Method Not Allowed ({method})")]
    MethodNotAllowed {
        method: String,
        allowed: &'static [&'static str],
    },

    // 409 Conflict (integrity constraints, locked records)
    #[error("{0}")]
    Conflict(String),

    // 413 Payload Too Large
    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    // 500 Internal Server Error
    #[error("{0}")]
    Internal(String),
}

impl ViewError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ViewError::BadRequest(_) => 400,
            ViewError::Forbidden(_) => 403,
            ViewError::NotFound(_) => 404,
            ViewError::MethodNotAllowed { .. } => 405,
            ViewError::Conflict(_) => 409,
            ViewError::PayloadTooLarge { .. } => 413,
            ViewError::Internal(_) => 500,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ViewError::BadRequest(_) => "BAD_REQUEST",
            ViewError::Forbidden(_) => "FORBIDDEN",
            ViewError::NotFound(_) => "NOT_FOUND",
            ViewError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            ViewError::Conflict(_) => "CONFLICT",
            ViewError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            ViewError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.to_string(),
            "code": self.error_code()
        })
    }
}

impl ViewError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ViewError::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ViewError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ViewError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ViewError::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ViewError::Internal(message.into())
    }

    pub fn method_not_allowed(method: &axum::http::Method, allowed: &'static [&'static str]) -> Self {
        ViewError::MethodNotAllowed {
            method: method.to_string(),
            allowed,
        }
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ViewError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if let ViewError::Internal(msg) = &self {
            tracing::error!("Internal view error: {}", msg);
        }

        let mut response = (status, Json(self.to_json())).into_response();
        if let ViewError::MethodNotAllowed { allowed, .. } = &self {
            if let Ok(value) = HeaderValue::from_str(&allowed.join(", ")) {
                response.headers_mut().insert(header::ALLOW, value);
            }
        }
        response
    }
}
