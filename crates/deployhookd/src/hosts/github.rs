//! GitHub webhook payloads.

use axum::http::HeaderMap;
use deployhook_core::NormalizedEvent;
use serde::Deserialize;

use super::{header_str, parse_body};
use crate::error::WebhookError;

pub const SOURCE: &str = "github";
pub const EVENT_HEADER: &str = "x-github-event";
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

#[derive(Debug, Deserialize)]
struct Payload {
    /// Absent on events such as `ping`; those then fail branch matching.
    #[serde(rename = "ref", default)]
    git_ref: String,
    repository: Repository,
}

#[derive(Debug, Deserialize)]
struct Repository {
    full_name: String,
    html_url: String,
}

/// The action label is the `X-GitHub-Event` header (`push`, `pull_request`, ...).
pub fn normalize(headers: &HeaderMap, body: &[u8]) -> Result<NormalizedEvent, WebhookError> {
    let label = header_str(headers, EVENT_HEADER)
        .ok_or(WebhookError::MissingEventHeader(EVENT_HEADER))?;
    let payload: Payload = parse_body(body)?;

    Ok(NormalizedEvent::new(
        payload.repository.full_name,
        payload.git_ref,
        label,
        payload.repository.html_url,
    ))
}
