//! Inbound request signature verification.
//!
//! The chat platform signs every callback with HMAC-SHA256 over
//! `v0:{timestamp}:{raw body}`. Verification recomputes the signature and
//! compares in constant time, and rejects timestamps outside a small
//! tolerance window to blunt replayed captures.

use guidetree_core::token::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed age (either direction) of the signed timestamp.
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

/// Compute the platform signature for a request body.
///
/// Exposed so tests can sign synthetic requests with the same code path.
pub fn sign(signing_secret: &str, timestamp: i64, body: &str) -> String {
    let base = format!("v0:{timestamp}:{body}");
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(base.as_bytes());
    format!("v0={}", hex_encode(&mac.finalize().into_bytes()))
}

/// Verify an inbound request's signature and timestamp freshness.
pub fn verify(
    signing_secret: &str,
    timestamp: i64,
    body: &str,
    provided_signature: &str,
    now_epoch_secs: i64,
) -> bool {
    if (now_epoch_secs - timestamp).abs() > TIMESTAMP_TOLERANCE_SECS {
        return false;
    }
    let expected = sign(signing_secret, timestamp, body);
    constant_time_eq(&expected, provided_signature)
}

/// Encode bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-signing-secret";
    const BODY: &str = "payload=%7B%22type%22%3A%22block_actions%22%7D";

    #[test]
    fn accepts_freshly_signed_request() {
        let now = 1_700_000_000;
        let sig = sign(SECRET, now, BODY);
        assert!(verify(SECRET, now, BODY, &sig, now));
    }

    #[test]
    fn accepts_signature_within_tolerance() {
        let now = 1_700_000_000;
        let ts = now - TIMESTAMP_TOLERANCE_SECS;
        let sig = sign(SECRET, ts, BODY);
        assert!(verify(SECRET, ts, BODY, &sig, now));
    }

    #[test]
    fn rejects_stale_timestamp() {
        let now = 1_700_000_000;
        let ts = now - TIMESTAMP_TOLERANCE_SECS - 1;
        let sig = sign(SECRET, ts, BODY);
        assert!(!verify(SECRET, ts, BODY, &sig, now));
    }

    #[test]
    fn rejects_tampered_body() {
        let now = 1_700_000_000;
        let sig = sign(SECRET, now, BODY);
        assert!(!verify(SECRET, now, "payload=tampered", &sig, now));
    }

    #[test]
    fn rejects_wrong_secret() {
        let now = 1_700_000_000;
        let sig = sign("other-secret", now, BODY);
        assert!(!verify(SECRET, now, BODY, &sig, now));
    }

    #[test]
    fn signature_has_version_prefix() {
        assert!(sign(SECRET, 0, "").starts_with("v0="));
    }
}
