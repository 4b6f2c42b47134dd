//! Interaction signature verification.
//!
//! The platform signs every request with Ed25519 over `timestamp + body`,
//! sending the hex signature in `X-Signature-Ed25519` and the timestamp in
//! `X-Signature-Timestamp`.

use std::time::{SystemTime, UNIX_EPOCH};

use ed25519_dalek::{Signature, Verifier, VerifyingKey, SIGNATURE_LENGTH};
use tracing::warn;

/// Maximum age in seconds of a signed timestamp.
///
/// Only the past direction is bounded: future timestamps are accepted, and
/// no replay cache is kept, so a captured request stays valid for this long.
pub const MAX_TIMESTAMP_AGE_SECS: i64 = 5;

/// Verify an interaction signature against the current wall clock.
///
/// Returns `false` for any missing, malformed, stale or mismatched input.
pub fn verify_signature(
    signature_hex: &str,
    timestamp: &str,
    body: &[u8],
    public_key: &[u8],
) -> bool {
    verify_signature_at(signature_hex, timestamp, body, public_key, unix_now())
}

/// Verify an interaction signature as of `now` (seconds since the epoch).
pub fn verify_signature_at(
    signature_hex: &str,
    timestamp: &str,
    body: &[u8],
    public_key: &[u8],
    now: i64,
) -> bool {
    if signature_hex.is_empty() || timestamp.is_empty() || public_key.is_empty() {
        warn!(
            has_signature = !signature_hex.is_empty(),
            has_timestamp = !timestamp.is_empty(),
            has_public_key = !public_key.is_empty(),
            "signature_missing_fields"
        );
        return false;
    }

    let signed_at: i64 = match timestamp.parse() {
        Ok(t) => t,
        Err(_) => {
            warn!(timestamp_length = timestamp.len(), "signature_invalid_timestamp");
            return false;
        }
    };

    let age = now.saturating_sub(signed_at);
    if age > MAX_TIMESTAMP_AGE_SECS {
        warn!(
            signed_at = signed_at,
            current_time = now,
            age_seconds = age,
            max_age_seconds = MAX_TIMESTAMP_AGE_SECS,
            "signature_stale"
        );
        return false;
    }

    let signature_bytes = match hex::decode(signature_hex) {
        Ok(bytes) => bytes,
        Err(_) => {
            warn!(signature_length = signature_hex.len(), "signature_invalid_hex");
            return false;
        }
    };

    let signature_bytes: [u8; SIGNATURE_LENGTH] = match signature_bytes.as_slice().try_into() {
        Ok(bytes) => bytes,
        Err(_) => {
            warn!(
                decoded_length = signature_bytes.len(),
                expected_length = SIGNATURE_LENGTH,
                "signature_invalid_length"
            );
            return false;
        }
    };
    let signature = Signature::from_bytes(&signature_bytes);

    let verifying_key = match <[u8; 32]>::try_from(public_key)
        .ok()
        .and_then(|bytes| VerifyingKey::from_bytes(&bytes).ok())
    {
        Some(key) => key,
        None => {
            warn!(public_key_length = public_key.len(), "signature_invalid_public_key");
            return false;
        }
    };

    let mut message = Vec::with_capacity(timestamp.len() + body.len());
    message.extend_from_slice(timestamp.as_bytes());
    message.extend_from_slice(body);

    let valid = verifying_key.verify(&message, &signature).is_ok();
    if !valid {
        warn!(body_length = body.len(), "signature_mismatch");
    }

    valid
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
