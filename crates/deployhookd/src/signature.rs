//! `X-Hub-Signature-256` verification.

use axum::http::HeaderValue;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::WebhookError;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Header value GitHub would send for `body` signed with `secret`.
pub fn sign(secret: &[u8], body: &[u8]) -> Result<String, WebhookError> {
    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|e| WebhookError::Internal(e.to_string()))?;
    mac.update(body);
    Ok(format!(
        "{SIGNATURE_PREFIX}{}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Check `header` against the HMAC-SHA256 of `body` in constant time.
pub fn verify(
    secret: &[u8],
    header: Option<&HeaderValue>,
    body: &[u8],
) -> Result<(), WebhookError> {
    let header = header.ok_or(WebhookError::MissingSignature)?;
    let value = header
        .to_str()
        .map_err(|_| WebhookError::InvalidSignatureFormat("non-ascii header".to_string()))?;
    let digest_hex = value.strip_prefix(SIGNATURE_PREFIX).ok_or_else(|| {
        WebhookError::InvalidSignatureFormat(format!("expected {SIGNATURE_PREFIX} prefix"))
    })?;
    let expected = hex::decode(digest_hex)
        .map_err(|e| WebhookError::InvalidSignatureFormat(e.to_string()))?;

    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|e| WebhookError::Internal(e.to_string()))?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| WebhookError::InvalidSignature)
}
