//! Errors raised while accepting a webhook request.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Rejections produced before a deployment is handed off.
///
/// Deployment outcomes never show up here; once an event is normalized the
/// sender always gets `202 Accepted`.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("missing event header {0}")]
    MissingEventHeader(&'static str),

    #[error("missing signature header")]
    MissingSignature,

    #[error("invalid signature format: {0}")]
    InvalidSignatureFormat(String),

    #[error("invalid signature")]
    InvalidSignature,

    /// Well-formed but nothing to deploy (e.g. a tag-only push).
    #[error("ignored: {0}")]
    Ignored(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl WebhookError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidPayload(_) | Self::MissingEventHeader(_) => StatusCode::BAD_REQUEST,
            Self::MissingSignature | Self::InvalidSignatureFormat(_) | Self::InvalidSignature => {
                StatusCode::UNAUTHORIZED
            }
            Self::Ignored(_) => StatusCode::ACCEPTED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        // Details stay in the logs.
        let body = match &self {
            Self::InvalidPayload(_) => "Invalid payload",
            Self::MissingEventHeader(_) => "Missing event header",
            Self::MissingSignature => "Missing signature",
            Self::InvalidSignatureFormat(_) => "Invalid signature format",
            Self::InvalidSignature => "Invalid signature",
            Self::Ignored(_) => "",
            Self::Internal(_) => "Internal server error",
        };
        (self.status_code(), body).into_response()
    }
}
