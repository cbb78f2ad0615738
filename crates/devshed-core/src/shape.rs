//! Normalization of the API's variable response shapes.
//!
//! The service wraps results inconsistently: a list payload may arrive as a
//! raw array, as an object carrying the real array under a conventional key,
//! or as a bare entity; read payloads are sometimes double-enveloped under a
//! nested `data` field. Each response is decoded here exactly once instead of
//! duck-typed at every call site.

use serde_json::Value;
use thiserror::Error;

/// Candidate wrapper keys for project list payloads, scanned in order.
pub const PROJECT_KEYS: &[&str] = &["projects", "data", "items", "results"];

/// Candidate wrapper keys for task list payloads, scanned in order.
pub const TASK_KEYS: &[&str] = &["tasks", "data", "items", "results"];

/// A payload was neither an array nor an object where a collection was
/// expected.
#[derive(Debug, Error)]
#[error("invalid response shape: expected an array or object, got {found}")]
pub struct ShapeError {
    found: &'static str,
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Locate the entity collection inside `payload`.
///
/// Raw arrays are returned as-is. For objects, `candidate_keys` are scanned
/// in order and the first key holding an array wins; the scan order is a
/// fixed policy, entity-specific keys shadow the generic wrappers. An object
/// with no matching key is treated as a single entity and wrapped in a
/// one-element vec.
pub fn extract_collection(
    payload: &Value,
    candidate_keys: &[&str],
) -> Result<Vec<Value>, ShapeError> {
    match payload {
        Value::Array(items) => Ok(items.clone()),
        Value::Object(map) => {
            for key in candidate_keys {
                if let Some(Value::Array(items)) = map.get(*key) {
                    return Ok(items.clone());
                }
            }
            Ok(vec![payload.clone()])
        }
        other => Err(ShapeError {
            found: json_type(other),
        }),
    }
}

/// Unwrap a double-enveloped entity payload.
///
/// When the payload carries an object-valued `data` field, that inner object
/// is the entity. Exactly one level is unwrapped; deeper nesting is left for
/// the caller to interpret.
pub fn extract_entity(payload: &Value) -> &Value {
    match payload.get("data") {
        Some(inner) if inner.is_object() => inner,
        _ => payload,
    }
}
