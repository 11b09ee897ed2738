//! Bitbucket Cloud webhook payloads.
//!
//! A push carries one entry per updated ref in `push.changes`; only the first
//! branch update is deployed.

use axum::http::HeaderMap;
use deployhook_core::{NormalizedEvent, REF_PREFIX};
use serde::Deserialize;

use super::{header_str, parse_body};
use crate::error::WebhookError;

pub const SOURCE: &str = "bitbucket";
pub const EVENT_HEADER: &str = "x-event-key";
const EVENT_PREFIX: &str = "repo:";
const DEFAULT_LABEL: &str = "push";

#[derive(Debug, Deserialize)]
struct Payload {
    repository: Repository,
    #[serde(default)]
    push: Option<Push>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    full_name: String,
    links: Links,
}

#[derive(Debug, Deserialize)]
struct Links {
    html: Link,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
}

#[derive(Debug, Deserialize)]
struct Push {
    #[serde(default)]
    changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
struct Change {
    /// `null` when the ref was deleted.
    #[serde(default)]
    new: Option<RefState>,
}

#[derive(Debug, Deserialize)]
struct RefState {
    #[serde(rename = "type")]
    kind: String,
    name: String,
}

/// `repo:push` → `push`; a missing header means `push`.
fn action_label(headers: &HeaderMap) -> String {
    match header_str(headers, EVENT_HEADER) {
        Some(key) => key.strip_prefix(EVENT_PREFIX).unwrap_or(key).to_string(),
        None => DEFAULT_LABEL.to_string(),
    }
}

pub fn normalize(headers: &HeaderMap, body: &[u8]) -> Result<NormalizedEvent, WebhookError> {
    let payload: Payload = parse_body(body)?;

    let branch = payload
        .push
        .iter()
        .flat_map(|p| p.changes.iter())
        .filter_map(|c| c.new.as_ref())
        .find(|state| state.kind == "branch")
        .ok_or_else(|| WebhookError::Ignored("no branch update in payload".to_string()))?;

    Ok(NormalizedEvent::new(
        payload.repository.full_name,
        format!("{REF_PREFIX}{}", branch.name),
        action_label(headers),
        payload.repository.links.html.href,
    ))
}
