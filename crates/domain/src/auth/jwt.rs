//! Expiry extraction from structured (claims-bearing) tokens.
//!
//! Only the payload segment is inspected; signatures are never verified here.
//! A value that does not look like a claims token at all is the normal
//! opaque-token path and falls back to the configured lifetime.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// Outcome of decoding a token's expiry claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenDecode {
    /// The payload carries an `exp` claim, converted to epoch milliseconds.
    DecodedWithClaim(i64),
    /// The payload decodes but has no usable `exp` claim.
    NoExpiryClaim,
    /// The value is not a structured token.
    NotStructuredToken,
    /// The payload decodes but its `exp` claim does not fit a timestamp.
    MalformedStructuredToken(String),
}

/// Decodes the `exp` claim of `token`.
///
/// `token` may carry a scheme prefix such as `"Bearer "`; the payload is
/// always the second dot-separated segment, so the prefix only touches the
/// header segment.
#[must_use]
pub fn decode_expiry(token: &str) -> TokenDecode {
    let Some(segment) = token.split('.').nth(1) else {
        return TokenDecode::NotStructuredToken;
    };

    let Ok(bytes) = URL_SAFE_NO_PAD.decode(segment.trim_end_matches('=')) else {
        return TokenDecode::NotStructuredToken;
    };

    let Ok(payload) = serde_json::from_slice::<Value>(&bytes) else {
        return TokenDecode::NotStructuredToken;
    };

    match payload.get("exp") {
        Some(Value::Number(exp)) => exp.as_i64().map_or_else(
            || float_claim(exp.as_f64().unwrap_or(f64::NAN), exp),
            |seconds| integer_claim(seconds, exp),
        ),
        Some(Value::String(exp)) => string_claim(exp.trim()),
        _ => TokenDecode::NoExpiryClaim,
    }
}

/// Numeric strings are read as the claim; anything else carries no expiry.
fn string_claim(exp: &str) -> TokenDecode {
    if exp.is_empty() {
        return TokenDecode::NoExpiryClaim;
    }

    if let Ok(seconds) = exp.parse::<i64>() {
        return integer_claim(seconds, &exp);
    }

    match exp.parse::<f64>() {
        Ok(seconds) if seconds.is_finite() => float_claim(seconds, &exp),
        _ => TokenDecode::NoExpiryClaim,
    }
}

fn integer_claim(seconds: i64, raw: &dyn fmt::Display) -> TokenDecode {
    match seconds.checked_mul(1000) {
        Some(0) => TokenDecode::NoExpiryClaim,
        Some(millis) => TokenDecode::DecodedWithClaim(millis),
        None => TokenDecode::MalformedStructuredToken(format!("exp claim overflows: {raw}")),
    }
}

fn float_claim(seconds: f64, raw: &dyn fmt::Display) -> TokenDecode {
    let millis = (seconds * 1000.0).round();
    #[allow(clippy::cast_precision_loss)]
    let in_range = millis.is_finite() && millis.abs() < i64::MAX as f64;
    if !in_range {
        return TokenDecode::MalformedStructuredToken(format!("exp claim out of range: {raw}"));
    }

    #[allow(clippy::cast_possible_truncation)]
    let millis = millis as i64;
    if millis == 0 {
        TokenDecode::NoExpiryClaim
    } else {
        TokenDecode::DecodedWithClaim(millis)
    }
}

/// Resolves the expiry of `token` in epoch milliseconds.
///
/// The claim wins when present; otherwise `now_millis + ttl_seconds * 1000`,
/// or `0` when `ttl_seconds` is zero. The caller maps `0` to "no expiry".
///
/// # Errors
///
/// Returns [`DomainError::MalformedStructuredToken`] when the token's claim
/// cannot be interpreted.
pub fn resolve_expiration(token: &str, ttl_seconds: u64, now_millis: i64) -> DomainResult<i64> {
    let fallback = i64::try_from(ttl_seconds)
        .ok()
        .and_then(|ttl| ttl.checked_mul(1000))
        .filter(|ttl| *ttl > 0)
        .map_or(0, |ttl| now_millis.saturating_add(ttl));

    match decode_expiry(token) {
        TokenDecode::DecodedWithClaim(millis) => Ok(millis),
        TokenDecode::NoExpiryClaim | TokenDecode::NotStructuredToken => Ok(fallback),
        TokenDecode::MalformedStructuredToken(reason) => {
            Err(DomainError::MalformedStructuredToken(reason))
        }
    }
}
