use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::RegistryError;

/// Envelope shared by every rule endpoint.
#[derive(Debug, Serialize)]
pub struct CommonResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Error portion of the envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: String,
}

impl<T> CommonResponse<T> {
    /// Successful response carrying data.
    pub fn ok(data: T) -> Self {
        CommonResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Successful response without data.
    pub fn empty() -> Self {
        CommonResponse {
            success: true,
            data: None,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, code: impl Into<String>) -> Self {
        CommonResponse {
            success: false,
            data: None,
            error: Some(ErrorBody {
                message: message.into(),
                code: code.into(),
            }),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub rules: usize,
    pub generation: u64,
    pub uptime_secs: u64,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub rules: usize,
    pub generation: u64,
}

impl RegistryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RegistryError::Validation(_) | RegistryError::MalformedRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
            RegistryError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let body = CommonResponse::<()>::failure(self.to_string(), self.code());
        (self.status_code(), Json(body)).into_response()
    }
}
