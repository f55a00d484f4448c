//! Encoder — converts a dynamic value into compact JSON text.
//!
//! The runtime's tables carry no array/object tag, so every table is
//! classified by a single scan over its keys:
//!
//! - **Array**: the keys are exactly `1..N` (in any insertion order)
//! - **Object**: anything else; non-string keys are stringified or dropped
//!   according to [`KeyPolicy`]
//! - **Empty**: undecidable from structure, resolved by
//!   [`EncodeOptions::empty_table_as_array`]
//!
//! The classified tree is built as a `serde_json::Value` and printed with
//! `serde_json::to_string` (compact, standard escaping).
//!
//! # Example
//! ```
//! use tablejson_core::{encode, Table, Value};
//!
//! let mut t = Table::new();
//! t.insert("name", "x");
//! t.insert("n", 3);
//! assert_eq!(encode(&Value::Table(t), false).unwrap(), r#"{"name":"x","n":3}"#);
//! ```

use crate::error::{Error, Result};
use crate::value::{Key, Table, Value, MAX_DEPTH};
use serde_json::{Map, Number, Value as Json};

/// What to do with object keys that are neither strings nor integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPolicy {
    /// Use the host's string conversion (`1.5` → `"1.5"`, `true` → `"true"`).
    #[default]
    Stringify,
    /// Leave float and boolean keys out of the object. Integer keys are
    /// always kept as their decimal text.
    Drop,
}

/// Encoding policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    /// Emit empty tables as `[]` instead of `{}`.
    pub empty_table_as_array: bool,
    pub key_policy: KeyPolicy,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty_table_as_array(mut self, yes: bool) -> Self {
        self.empty_table_as_array = yes;
        self
    }

    pub fn key_policy(mut self, policy: KeyPolicy) -> Self {
        self.key_policy = policy;
        self
    }
}

/// Structural classification of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Empty,
    Array,
    Object,
}

/// Encode a top-level table into compact JSON text.
///
/// Fails with [`Error::InvalidArgument`] ("table expected") when `value` is
/// not a table, and with [`Error::TooDeep`] when tables nest past
/// [`MAX_DEPTH`], the bound the decoder enforces on the way back.
pub fn encode(value: &Value, encode_empty_table_as_array: bool) -> Result<String> {
    let options = EncodeOptions::new().empty_table_as_array(encode_empty_table_as_array);
    encode_with(value, &options)
}

/// [`encode`] with the full set of options.
pub fn encode_with(value: &Value, options: &EncodeOptions) -> Result<String> {
    if !matches!(value, Value::Table(_)) {
        return Err(Error::invalid_argument(
            "encode",
            1,
            format!("table expected, got {}", value.type_name()),
        ));
    }
    if value.nesting_exceeds(MAX_DEPTH) {
        return Err(Error::TooDeep { limit: MAX_DEPTH });
    }
    let json = to_json(value, options);
    Ok(serde_json::to_string(&json)?)
}

/// Build the JSON tree for any value, without the top-level table check.
///
/// Floats with no JSON representation (`NaN`, `±inf`) become `null`.
pub fn to_json(value: &Value, options: &EncodeOptions) -> Json {
    match value {
        Value::Nil => Json::Null,
        Value::Boolean(b) => Json::Bool(*b),
        Value::Integer(i) => Json::Number(Number::from(*i)),
        Value::Float(f) => Number::from_f64(*f).map_or(Json::Null, Json::Number),
        Value::String(s) => Json::String(s.clone()),
        Value::Table(t) => table_to_json(t, options),
    }
}

/// Classify a table in one pass over its keys.
///
/// Keys are unique, so `N` keys that all fall in `1..=N` are exactly
/// `{1, ..., N}`. The scan stops at the first key outside that range.
pub fn classify(table: &Table) -> Shape {
    if table.is_empty() {
        return Shape::Empty;
    }
    let len = table.len() as u64;
    let dense = table
        .keys()
        .all(|key| matches!(key, Key::Integer(i) if *i >= 1 && (*i as u64) <= len));
    if dense {
        Shape::Array
    } else {
        Shape::Object
    }
}

fn table_to_json(table: &Table, options: &EncodeOptions) -> Json {
    let shape = classify(table);
    tracing::trace!(entries = table.len(), ?shape, "classified table");
    match shape {
        Shape::Empty if options.empty_table_as_array => Json::Array(Vec::new()),
        Shape::Empty => Json::Object(Map::new()),
        Shape::Array => {
            // Placed by index: a dense table may have been filled out of order.
            let mut slots = vec![Json::Null; table.len()];
            for (key, value) in table.iter() {
                if let Key::Integer(i) = key {
                    slots[(*i - 1) as usize] = to_json(value, options);
                }
            }
            Json::Array(slots)
        }
        Shape::Object => {
            let mut map = Map::with_capacity(table.len());
            for (key, value) in table.iter() {
                let name = match (key, options.key_policy) {
                    (Key::String(s), _) => s.clone(),
                    (Key::Integer(i), _) => i.to_string(),
                    (_, KeyPolicy::Stringify) => key.to_host_string(),
                    (_, KeyPolicy::Drop) => continue,
                };
                // Collisions after stringification: last write wins.
                map.insert(name, to_json(value, options));
            }
            Json::Object(map)
        }
    }
}
