use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use hyper::StatusCode;
use serde_json::json;

use crate::error::LibraryError;

/// An error response: a status plus a `{ "error": ... }` body. Messages are
/// safe to show the user; store failures carry only a generic message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Map a library failure. `failure` is the generic message sent for
    /// unexpected errors, whose details only go to the log.
    pub fn from_library(err: LibraryError, failure: &'static str) -> Self {
        match err {
            LibraryError::Validation(message) => Self::bad_request(message),
            LibraryError::NotFound { kind, id } => {
                tracing::debug!(kind = kind.label(), id = %id, "lookup miss");
                Self::new(StatusCode::NOT_FOUND, format!("{} not found", kind.label()))
            }
            LibraryError::Store(e) => {
                tracing::error!(error = %e, "{failure}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, failure)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejected request body");
        Self::bad_request("Invalid request body")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
