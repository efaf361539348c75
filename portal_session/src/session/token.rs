use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

/// Expiry of a JWT access token, read from its `exp` claim.
///
/// The signature is not checked; the client cannot verify it and only uses
/// the claim to avoid restoring a session the backend would reject anyway.
/// Opaque tokens have no known expiry.
pub(crate) fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let decoded = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Value = serde_json::from_slice(&decoded).ok()?;
    let exp = match claims.get("exp")? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?,
        _ => return None,
    };

    DateTime::from_timestamp(exp, 0)
}

/// A leeway too large to add to the current time puts every JWT inside it.
pub(crate) fn is_expired(token: &str, leeway_secs: i64) -> bool {
    let Some(expiry) = token_expiry(token) else {
        return false;
    };
    let horizon = Duration::try_seconds(leeway_secs)
        .and_then(|leeway| Utc::now().checked_add_signed(leeway));
    match horizon {
        Some(horizon) => expiry <= horizon,
        None => leeway_secs > 0,
    }
}
