use chrono::DateTime;
use serde_json::{Map, Value};

use super::errors::NormalizeError;
use super::types::{AccountStatus, Principal, Role};

/// Spellings that backends use for a canonical field, after snake_casing.
const FIELD_ALIASES: &[(&str, &str)] = &[
    ("_id", "id"),
    ("full_name", "name"),
    ("display_name", "name"),
    ("status", "account_status"),
    ("phone_number", "phone"),
    ("mobile", "phone"),
    ("specialization", "specialty"),
    ("speciality", "specialty"),
    ("uhid_number", "uhid"),
];

/// Canonical fields that hold identifiers and must be strings even when a
/// backend sends them as numbers.
const STRING_FIELDS: &[&str] = &["id", "hospital_id", "uhid", "phone"];

/// Convert a backend principal payload into the canonical [`Principal`].
///
/// Keys are snake_cased and aliases folded together. When the same field is
/// present under several spellings the richer value wins (longer string, more
/// entries), ties going to the spelling that is already canonical. Fields
/// without a slot in [`Principal`] are kept in `extra`.
///
/// `fallback_role` is used only when the payload carries no role at all, for
/// endpoints whose route already implies it.
pub fn normalize_principal(
    raw: &Value,
    fallback_role: Option<Role>,
) -> Result<Principal, NormalizeError> {
    let Value::Object(object) = raw else {
        return Err(NormalizeError::NotAnObject);
    };

    let mut fields = canonicalize_object(object);

    for key in STRING_FIELDS {
        if let Some(Value::Number(n)) = fields.get(*key) {
            let as_string = n.to_string();
            fields.insert((*key).to_string(), Value::String(as_string));
        }
    }

    match fields.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => {}
        _ => return Err(NormalizeError::MissingField("id")),
    }

    let role = match fields.get("role") {
        Some(Value::String(role)) => role.parse::<Role>()?,
        Some(Value::Null) | None => fallback_role.ok_or(NormalizeError::MissingField("role"))?,
        Some(other) => return Err(NormalizeError::UnknownRole(other.to_string())),
    };
    fields.insert("role".to_string(), Value::String(role.as_str().to_string()));

    let status = match fields.get("account_status") {
        Some(Value::String(status)) if !status.trim().is_empty() => {
            status.parse::<AccountStatus>()?
        }
        Some(Value::String(_)) | Some(Value::Null) | None => AccountStatus::Active,
        Some(other) => return Err(NormalizeError::UnknownStatus(other.to_string())),
    };
    fields.insert(
        "account_status".to_string(),
        Value::String(status.as_str().to_string()),
    );

    fill_name(&mut fields);
    lift_hospital(&mut fields);
    keep_parseable_created_at(&mut fields);

    Ok(serde_json::from_value(Value::Object(fields))?)
}

/// snake_case a camelCase, PascalCase or kebab-case key. Acronyms stay
/// together: "patientUHID" becomes "patient_uhid".
pub(crate) fn to_snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' {
            out.push('_');
            continue;
        }
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

fn canonical_key(key: &str) -> String {
    let snake = to_snake_case(key);
    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == snake)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(snake)
}

fn canonicalize_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(canonicalize_object(map)),
        Value::Array(items) => Value::Array(items.iter().map(canonicalize_value).collect()),
        other => other.clone(),
    }
}

fn canonicalize_object(object: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();

    for (key, value) in object {
        let canonical = canonical_key(key);
        let value = canonicalize_value(value);

        let replace = match out.get(&canonical) {
            None => true,
            Some(existing) => {
                let (new_rank, old_rank) = (richness(&value), richness(existing));
                new_rank > old_rank || (new_rank == old_rank && *key == canonical)
            }
        };

        if replace {
            out.insert(canonical, value);
        }
    }

    out
}

fn richness(value: &Value) -> usize {
    match value {
        Value::Null => 0,
        Value::Bool(_) | Value::Number(_) => 1,
        Value::String(s) => s.trim().chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.values().filter(|v| !v.is_null()).count(),
    }
}

fn non_empty_str<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn fill_name(fields: &mut Map<String, Value>) {
    if non_empty_str(fields, "name").is_some() {
        return;
    }
    let parts: Vec<&str> = ["first_name", "last_name"]
        .iter()
        .filter_map(|key| non_empty_str(fields, key))
        .collect();
    if parts.is_empty() {
        fields.remove("name");
    } else {
        let name = parts.join(" ");
        fields.insert("name".to_string(), Value::String(name));
    }
}

/// Coordinators may carry their affiliation as a nested `hospital` object or
/// as a bare hospital name. Either way the dedicated fields are filled and the
/// original value stays in `extra`.
fn lift_hospital(fields: &mut Map<String, Value>) {
    let (id, name) = match fields.get("hospital") {
        Some(Value::Object(hospital)) => (
            hospital.get("id").and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }),
            hospital
                .get("name")
                .or_else(|| hospital.get("hospital_name"))
                .and_then(Value::as_str)
                .map(str::to_string),
        ),
        Some(Value::String(name)) => (None, Some(name.clone())),
        _ => (None, None),
    };

    if let Some(id) = id {
        if non_empty_str(fields, "hospital_id").is_none() {
            fields.insert("hospital_id".to_string(), Value::String(id));
        }
    }
    if let Some(name) = name {
        if non_empty_str(fields, "hospital_name").is_none() {
            fields.insert("hospital_name".to_string(), Value::String(name));
        }
    }
}

fn keep_parseable_created_at(fields: &mut Map<String, Value>) {
    let parseable = match fields.get("created_at") {
        None | Some(Value::Null) => return,
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s).is_ok(),
        Some(_) => false,
    };
    if !parseable {
        if let Some(raw) = fields.remove("created_at") {
            fields.insert("created_at_raw".to_string(), raw);
        }
    }
}
