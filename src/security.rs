//! Webhook signature verification and constant-time comparison helpers.

use crate::errors::ApiError;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Inbound webhook timestamps may drift at most this far from our clock.
pub const MAX_TIMESTAMP_SKEW_SECS: i64 = 5 * 60;

/// Constant-time string comparison to prevent timing attacks
/// Use this for comparing API keys, webhook secrets, and other sensitive values
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Compute the hex-encoded HMAC-SHA256 webhook signature over
/// `"{timestamp}." + raw_body`.
///
/// The body is signed as raw bytes; it does not have to be valid UTF-8.
pub fn sign_webhook(secret: &str, timestamp: i64, raw_body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(raw_body);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify an inbound webhook request.
///
/// Rejects with `Unauthorized` when the timestamp header is malformed, the
/// timestamp falls outside the ±5 minute freshness window (replay guard), or
/// the signature does not match the body. The signature comparison is
/// constant-time.
pub fn verify_webhook(
    secret: &str,
    timestamp_header: &str,
    signature_header: &str,
    raw_body: &[u8],
    now: DateTime<Utc>,
) -> Result<(), ApiError> {
    let timestamp: i64 = timestamp_header
        .trim()
        .parse()
        .map_err(|_| ApiError::Unauthorized)?;

    let age = (now.timestamp() - timestamp).abs();
    if age > MAX_TIMESTAMP_SKEW_SECS {
        return Err(ApiError::Unauthorized);
    }

    let expected = sign_webhook(secret, timestamp, raw_body);
    if !constant_time_compare(&expected, signature_header.trim()) {
        return Err(ApiError::Unauthorized);
    }

    Ok(())
}
