//! Just enough JWT parsing to tell whether a token has expired.
//!
//! Signatures are not checked; the backend does that. The client only needs
//! the `exp` claim to decide whether a stored token is worth sending.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Returns the expiry of `token`, or `None` if it is not a JWT carrying an
/// `exp` claim.
pub(crate) fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp?, 0)
}

/// Returns true if `token` is a JWT that expires after `now`.
pub(crate) fn is_unexpired(token: &str, now: DateTime<Utc>) -> bool {
    expires_at(token).is_some_and(|exp| exp > now)
}

#[cfg(test)]
pub(crate) fn encode(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}
