use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::upstream::UpstreamError;

/// Message used when a failure has no description of its own.
pub(crate) const UNKNOWN_ERROR: &str = "Unknown error";

/// Relay errors with their HTTP status codes.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Anything but POST or OPTIONS.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The `text` field is missing, not a string, or blank.
    #[error("Text content is required")]
    TextRequired,

    /// The request body is not valid JSON.
    #[error("{0}")]
    InvalidBody(#[from] serde_json::Error),

    /// The request body is the JSON literal `null`.
    #[error("Request body must not be null")]
    NullBody,

    /// The completion service could not be reached or returned garbage.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl RelayError {
    /// Get the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::TextRequired => StatusCode::BAD_REQUEST,
            Self::InvalidBody(_) | Self::NullBody | Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the caller, falling back to a placeholder for errors without one.
    pub fn message(&self) -> String {
        let message = self.to_string();

        if message.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            message
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_client_error() {
            // Client errors are answered in plain text.
            return (status, self.message()).into_response();
        }

        let message = self.message();
        log::error!("Relay failed ({}): {message}", status.as_u16());

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
