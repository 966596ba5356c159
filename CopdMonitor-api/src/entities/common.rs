use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error response format for API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            details: None,
        }
    }

    /// Create a not found error response
    pub fn not_found(resource: &str) -> Self {
        Self::new("not_found", format!("The requested {} could not be found", resource))
    }

    /// Create a validation error response
    pub fn validation_error(message: &str) -> Self {
        Self::new("validation_error", message)
    }

    /// Create a bad request error response
    pub fn bad_request(message: &str) -> Self {
        Self::new("bad_request", message)
    }

    /// Pairing is not possible on this server
    pub fn unsupported(message: &str) -> Self {
        Self::new("unsupported", message)
    }

    /// No device was chosen
    pub fn cancelled() -> Self {
        Self::new("cancelled", "No device was selected")
    }

    /// Talking to the device failed
    pub fn device_error(message: &str) -> Self {
        Self::new("device_error", message)
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self::new("internal_error", "An unexpected error occurred")
    }

    pub fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" | "bad_request" => StatusCode::BAD_REQUEST,
            "unsupported" => StatusCode::NOT_IMPLEMENTED,
            "cancelled" => StatusCode::CONFLICT,
            "device_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorResponse::not_found("profile").status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorResponse::validation_error("bad").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorResponse::unsupported("no adapter").status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(ErrorResponse::cancelled().status(), StatusCode::CONFLICT);
        assert_eq!(ErrorResponse::internal_error().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
