//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// JSON payload with a status code.
///
/// The payload is rendered bare; the web client reads fields straight off the
/// response body.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    status: StatusCode,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a 200 response.
    pub const fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            data,
        }
    }

    /// Create a 201 response.
    pub const fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.data)).into_response()
    }
}

/// `{"message": ...}` body.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// Create a 200 response carrying only a message.
pub fn message(message: impl Into<String>) -> ApiResponse<MessageBody> {
    ApiResponse::ok(MessageBody {
        message: message.into(),
    })
}

/// Empty success response.
#[must_use]
pub fn ok() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
