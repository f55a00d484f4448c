//! # tablejson-core
//!
//! Bidirectional conversion between the dynamic table values of an embedded
//! scripting runtime and JSON text.
//!
//! The runtime's table type stands in for JSON arrays, JSON objects, and
//! (when empty) for either. The encoder settles the question structurally:
//! a table whose keys are exactly `1..N` is an array, anything else is an
//! object, and an empty table follows a caller-supplied flag. The decoder
//! maps arrays to tables keyed `1..N` and objects to tables keyed by member
//! name, preserving member order and the integer/float distinction.
//!
//! ## Quick start
//!
//! ```rust
//! use tablejson_core::{decode, encode, Table, Value};
//!
//! let list = Value::from(vec![Value::from("a"), Value::from("b")]);
//! assert_eq!(encode(&list, false).unwrap(), r#"["a","b"]"#);
//!
//! let back = decode(r#"["a","b"]"#);
//! assert_eq!(back, list);
//!
//! assert_eq!(encode(&Value::Table(Table::new()), true).unwrap(), "[]");
//! assert_eq!(decode("{not json"), Value::Nil);
//! ```
//!
//! ## Modules
//!
//! - [`value`] — `Value`, `Key` and `Table`: the runtime's value model
//! - [`encoder`] — table → JSON text (`encode`, `EncodeOptions`, `classify`)
//! - [`decoder`] — JSON text → value (`decode`, `decode_strict`)
//! - [`module`] — the two-function module surface with host-style argument checks
//! - [`literal`] — table-constructor syntax (`parse`, `render`)
//! - [`error`] — Error types

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod literal;
pub mod module;
pub mod value;

pub use decoder::{decode, decode_strict, from_json};
pub use encoder::{classify, encode, encode_with, to_json, EncodeOptions, KeyPolicy, Shape};
pub use error::{Error, Result};
pub use value::{Key, Table, Value, MAX_DEPTH};
