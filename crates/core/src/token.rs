//! Edit-token generation and validation primitives.
//!
//! An edit token is a capability, not a session: an opaque high-entropy
//! string granting time-boxed write access to exactly one tree through the
//! browser editor API. Tokens are issued on demand, never renewed, and
//! never deleted -- an expired row simply fails the validity predicate on
//! every subsequent lookup.

use chrono::Duration;
use rand::Rng;

use crate::types::Timestamp;

/// Length of the generated token string (alphanumeric characters).
pub const TOKEN_LENGTH: usize = 48;

/// How long an issued token remains valid.
pub fn edit_token_ttl() -> Duration {
    Duration::hours(1)
}

/// Generate a new random edit token.
pub fn generate_edit_token() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Compute the expiry timestamp for a token issued at `now`.
pub fn expiry_from(now: Timestamp) -> Timestamp {
    now + edit_token_ttl()
}

/// Whether a token with the given expiry is no longer valid at `now`.
///
/// Validity is a predicate evaluated per-request; nothing ever deletes
/// expired rows.
pub fn is_expired(expires_at: Timestamp, now: Timestamp) -> bool {
    now > expires_at
}

/// Constant-time string equality.
///
/// A short-circuiting comparison would leak timing information about how
/// much of a guessed token matches. Length mismatch still returns early --
/// the length of the token format is public.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn generated_token_has_expected_length() {
        assert_eq!(generate_edit_token().len(), TOKEN_LENGTH);
    }

    #[test]
    fn generated_token_is_alphanumeric() {
        assert!(generate_edit_token().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn consecutive_tokens_differ() {
        assert_ne!(generate_edit_token(), generate_edit_token());
    }

    #[test]
    fn expiry_is_one_hour_out() {
        let now = Utc.timestamp_opt(1_000_000, 0).unwrap();
        assert_eq!(expiry_from(now) - now, Duration::hours(1));
    }

    #[test]
    fn token_valid_before_expiry() {
        let now = Utc.timestamp_opt(1_000_000, 0).unwrap();
        assert!(!is_expired(now + Duration::seconds(1), now));
    }

    #[test]
    fn token_valid_exactly_at_expiry() {
        // Validity is `now > expires_at`, so the boundary instant passes.
        let now = Utc.timestamp_opt(1_000_000, 0).unwrap();
        assert!(!is_expired(now, now));
    }

    #[test]
    fn token_invalid_after_expiry() {
        let now = Utc.timestamp_opt(1_000_000, 0).unwrap();
        assert!(is_expired(now - Duration::seconds(1), now));
    }

    #[test]
    fn constant_time_eq_matches_equal_strings() {
        assert!(constant_time_eq("abcdef", "abcdef"));
    }

    #[test]
    fn constant_time_eq_rejects_differing_strings() {
        assert!(!constant_time_eq("abcdef", "abcdeg"));
    }

    #[test]
    fn constant_time_eq_rejects_length_mismatch() {
        assert!(!constant_time_eq("abc", "abcd"));
    }
}
