//! Identifier handling for records returned by the DevShed API.
//!
//! The service is backed by MongoDB and is inconsistent about how it encodes
//! identifiers: some endpoints return plain strings, others the extended-JSON
//! `{"$oid": "..."}` wrapper, and list endpoints have been seen mixing both in
//! one payload. Everything that compares, displays or re-sends an id goes
//! through [`normalize_id`] first.

use serde_json::Value;

/// Collapse any identifier representation to a plain string.
///
/// Plain strings pass through unchanged and `{"$oid": "..."}` wrappers yield
/// the inner string. Any other non-null value falls back to its serialized
/// form so the result is always displayable. Returns `None` only for null.
pub fn normalize_id(raw: &Value) -> Option<String> {
    match raw {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => match map.get("$oid").and_then(Value::as_str) {
            Some(oid) => Some(oid.to_string()),
            None => Some(raw.to_string()),
        },
        other => Some(other.to_string()),
    }
}

/// Stable display/selection key for one row of a rendered collection.
///
/// Prefers the record's `_id`, then `id`, then a synthetic
/// `<prefix>-<index>` token, so every row gets a unique key even when the
/// server omits identifiers.
pub fn entity_key(entity: &Value, index: usize, prefix: &str) -> String {
    entity
        .get("_id")
        .and_then(normalize_id)
        .filter(|id| !id.is_empty())
        .or_else(|| {
            entity
                .get("id")
                .and_then(normalize_id)
                .filter(|id| !id.is_empty())
        })
        .unwrap_or_else(|| format!("{}-{}", prefix, index))
}
