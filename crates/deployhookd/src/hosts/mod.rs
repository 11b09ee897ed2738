//! Per-host payload adapters producing [`NormalizedEvent`]s.
//!
//! [`NormalizedEvent`]: deployhook_core::NormalizedEvent

pub mod bitbucket;
pub mod github;

use axum::http::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::WebhookError;

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, WebhookError> {
    serde_json::from_slice(body).map_err(|e| WebhookError::InvalidPayload(e.to_string()))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
