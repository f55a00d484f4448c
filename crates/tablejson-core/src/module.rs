//! The two-function module as the host runtime sees it.
//!
//! Host calls arrive as positional dynamic values and return one value.
//! Argument checking follows host conventions: errors name the argument
//! position and function, missing trailing arguments read as `nil`, and a
//! flag argument is read by truthiness rather than requiring a boolean.

use crate::decoder;
use crate::encoder;
use crate::error::{Error, Result};
use crate::value::{host_number_string, Value};

/// Name the module is registered under in the host.
pub const MODULE_NAME: &str = "cjson";

/// Exported function names, in registration order.
pub const FUNCTIONS: [&str; 2] = ["encode", "decode"];

/// Dispatch a host call by function name.
pub fn call(name: &str, args: &[Value]) -> Result<Value> {
    match name {
        "encode" => encode(args),
        "decode" => decode(args),
        other => Err(Error::UnknownFunction(other.to_string())),
    }
}

/// `encode(table [, empty_table_as_array])` → JSON string.
///
/// A table nested past [`MAX_DEPTH`](crate::value::MAX_DEPTH) yields `nil`
/// rather than an error, as a failed dump does in the host binding.
pub fn encode(args: &[Value]) -> Result<Value> {
    let value = arg(args, 1);
    if !matches!(value, Value::Table(_)) {
        return Err(Error::invalid_argument(
            "encode",
            1,
            format!("table expected, got {}", type_name_of(args, 1)),
        ));
    }
    let empty_table_as_array = arg(args, 2).is_truthy();
    match encoder::encode(value, empty_table_as_array) {
        Ok(json) => Ok(Value::String(json)),
        Err(Error::TooDeep { limit }) => {
            tracing::debug!(limit, "encode produced nil for an over-deep table");
            Ok(Value::Nil)
        }
        Err(err) => Err(err),
    }
}

/// `decode(text)` → decoded value, or `nil` when `text` is not valid JSON.
///
/// Numbers are accepted in place of strings and converted to text first.
pub fn decode(args: &[Value]) -> Result<Value> {
    let text = match arg(args, 1) {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => host_number_string(*f),
        _ => {
            return Err(Error::invalid_argument(
                "decode",
                1,
                format!("string expected, got {}", type_name_of(args, 1)),
            ))
        }
    };
    Ok(decoder::decode(&text))
}

static NIL: Value = Value::Nil;

/// 1-based positional argument; absent arguments read as `nil`.
fn arg(args: &[Value], position: usize) -> &Value {
    args.get(position - 1).unwrap_or(&NIL)
}

/// Hosts distinguish "no value" from an explicit `nil` in error messages.
fn type_name_of(args: &[Value], position: usize) -> &'static str {
    match args.get(position - 1) {
        Some(value) => value.type_name(),
        None => "no value",
    }
}
