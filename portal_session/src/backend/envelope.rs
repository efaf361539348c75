use serde_json::{Map, Value};

use super::types::BackendSession;

const TOKEN_KEYS: &[&str] = &["accessToken", "access_token", "token"];

const PRINCIPAL_KEYS: &[&str] = &[
    "user",
    "principal",
    "profile",
    "doctor",
    "patient",
    "coordinator",
    "admin",
    "superAdmin",
    "super_admin",
];

/// Pull the token and the principal out of whatever envelope the backend
/// wrapped them in.
///
/// Handles a bare principal, `{accessToken, user}`-style envelopes keyed by a
/// generic or role name, and either of those nested under `data`.
pub(crate) fn split_envelope(body: &Value) -> BackendSession {
    let Some(map) = body.as_object() else {
        return BackendSession::default();
    };

    let mut session = BackendSession {
        access_token: find_token(map),
        principal: None,
    };

    if has_id(map) && map.contains_key("role") {
        session.principal = Some(body.clone());
        return session;
    }

    session.principal = PRINCIPAL_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|value| value.is_object())
        .cloned();

    if let Some(data) = map.get("data").filter(|data| data.is_object()) {
        let inner = split_envelope(data);
        session.access_token = session.access_token.or(inner.access_token);
        session.principal = session.principal.or(inner.principal);
    }

    if session.principal.is_none() && has_id(map) {
        session.principal = Some(body.clone());
    }

    session
}

fn find_token(map: &Map<String, Value>) -> Option<String> {
    TOKEN_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|token| !token.is_empty())
        .map(str::to_string)
}

fn has_id(map: &Map<String, Value>) -> bool {
    map.contains_key("id") || map.contains_key("_id")
}

/// Human-readable message from an error response body.
pub(crate) fn error_message(body: &str, fallback: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = message_from_value(&value) {
            return message;
        }
    }

    let text = body.trim();
    if text.is_empty() || text.starts_with('{') || text.starts_with('<') {
        fallback.to_string()
    } else {
        text.chars().take(200).collect()
    }
}

fn message_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(map) => ["message", "error", "detail", "msg"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(message_from_value)
            .or_else(|| map.get("errors").and_then(message_from_value)),
        Value::Array(items) => items.iter().find_map(message_from_value),
        _ => None,
    }
}
