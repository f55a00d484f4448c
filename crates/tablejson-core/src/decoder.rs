//! Decoder — converts JSON text back into a dynamic value.
//!
//! JSON arrays become sequence tables keyed `1..N`, objects become tables
//! keyed by member name in document order, and scalars map onto the
//! matching value variant. A number literal decodes as an integer only when
//! its text has neither fraction nor exponent and fits in `i64`, so `-0`
//! is integer zero and `0.0` stays a float.
//!
//! Two entry points share the tree walk:
//!
//! - [`decode`] is lenient: malformed input yields [`Value::Nil`], which is
//!   indistinguishable from a document that is literally `null`.
//! - [`decode_strict`] reports malformed input as [`Error::Parse`], so
//!   `Ok(Value::Nil)` always means a genuine `null`.
//!
//! [`Error::Parse`]: crate::error::Error::Parse

use crate::error::{Error, Result};
use crate::value::{Key, Table, Value, MAX_DEPTH};
use serde_json::Value as Json;

/// Decode JSON text, degrading to [`Value::Nil`] on any parse failure.
pub fn decode(text: &str) -> Value {
    match decode_strict(text) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(error = %err, "lenient decode absorbed parse failure");
            Value::Nil
        }
    }
}

/// Decode JSON text, reporting malformed input as an error.
///
/// Documents nesting deeper than [`MAX_DEPTH`] fail with
/// [`Error::TooDeep`], the same bound the encoder applies.
pub fn decode_strict(text: &str) -> Result<Value> {
    let json: Json = serde_json::from_str(text)?;
    if nesting_exceeds(&json, MAX_DEPTH) {
        return Err(Error::TooDeep { limit: MAX_DEPTH });
    }
    Ok(from_json(&json))
}

/// Walk a JSON tree into the equivalent dynamic value.
pub fn from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Nil,
        Json::Bool(b) => Value::Boolean(*b),
        Json::Number(n) => number_to_value(n),
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => {
            Value::Table(Table::from_sequence(items.iter().map(from_json).collect()))
        }
        Json::Object(map) => {
            // Parsed object keys are already unique.
            let entries = map
                .iter()
                .map(|(k, v)| (Key::String(k.clone()), from_json(v)))
                .collect();
            Value::Table(Table::from_unique_entries(entries))
        }
    }
}

fn nesting_exceeds(json: &Json, limit: usize) -> bool {
    match json {
        Json::Array(items) => limit == 0 || items.iter().any(|v| nesting_exceeds(v, limit - 1)),
        Json::Object(map) => limit == 0 || map.values().any(|v| nesting_exceeds(v, limit - 1)),
        _ => false,
    }
}

/// Numbers keep their literal text (`arbitrary_precision`), so the kind is
/// read from the text itself. Integer-form literals outside `i64` become
/// floats.
fn number_to_value(n: &serde_json::Number) -> Value {
    let text = n.to_string();
    if !text.contains(|c: char| matches!(c, '.' | 'e' | 'E')) {
        if let Ok(i) = text.parse::<i64>() {
            return Value::Integer(i);
        }
    }
    Value::Float(text.parse::<f64>().unwrap_or(f64::NAN))
}
