//! Typed error responses for route handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pm_types::AppError;
use serde::Serialize;
use utoipa::ToSchema;

/// JSON error body returned by every failing endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable error message
    #[schema(example = "Provider 'tiktok' is not connected")]
    pub error: String,
}

/// Error response carrying an HTTP status and a message
///
/// Handlers return `Result<Response, ApiErrorResponse>` so `?` works on
/// anything convertible from `AppError`.
#[derive(Debug)]
pub struct ApiErrorResponse {
    pub status: StatusCode,
    pub message: String,
}

impl ApiErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<AppError> for ApiErrorResponse {
    fn from(err: AppError) -> Self {
        let status = match &err {
            AppError::InvalidParams(_) | AppError::NotConnected(_) => StatusCode::BAD_REQUEST,
            AppError::OAuth(_) | AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Storage(_)
            | AppError::Internal(_)
            | AppError::Io(_)
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self {
            status,
            message: err.to_string(),
        }
    }
}
