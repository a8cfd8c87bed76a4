//! Positional argument decoding for call frames.

use serde_json::Value;
use weft_common::BridgeError;

fn malformed(what: &str, index: usize, expected: &str) -> BridgeError {
    BridgeError::MalformedArgs(format!("{what} (argument {index}) must be {expected}"))
}

pub(crate) fn required<'a>(
    args: &'a [Value],
    index: usize,
    what: &str,
) -> Result<&'a Value, BridgeError> {
    args.get(index)
        .ok_or_else(|| BridgeError::MalformedArgs(format!("{what} (argument {index}) is missing")))
}

/// Unsigned id, given either as a JSON number or as a numeric string.
pub(crate) fn id(args: &[Value], index: usize, what: &str) -> Result<u64, BridgeError> {
    match required(args, index, what)? {
        Value::Number(n) => n.as_u64().ok_or_else(|| malformed(what, index, "an unsigned integer")),
        Value::String(s) => s
            .parse()
            .map_err(|_| malformed(what, index, "an unsigned integer")),
        _ => Err(malformed(what, index, "an unsigned integer")),
    }
}

pub(crate) fn flag(args: &[Value], index: usize, what: &str) -> Result<bool, BridgeError> {
    required(args, index, what)?
        .as_bool()
        .ok_or_else(|| malformed(what, index, "a boolean"))
}

pub(crate) fn text<'a>(args: &'a [Value], index: usize, what: &str) -> Result<&'a str, BridgeError> {
    required(args, index, what)?
        .as_str()
        .ok_or_else(|| malformed(what, index, "a string"))
}

/// A present argument that may be null.
pub(crate) fn nullable_text(
    args: &[Value],
    index: usize,
    what: &str,
) -> Result<Option<String>, BridgeError> {
    match required(args, index, what)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(malformed(what, index, "a string or null")),
    }
}

pub(crate) fn nullable_i64(
    args: &[Value],
    index: usize,
    what: &str,
) -> Result<Option<i64>, BridgeError> {
    match required(args, index, what)? {
        Value::Null => Ok(None),
        v => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| malformed(what, index, "an integer or null")),
    }
}

/// Trailing JSON payload. Missing or null means no value; strings are taken
/// as already-serialized JSON; any other value is serialized here.
pub(crate) fn payload(args: &[Value], index: usize) -> Option<String> {
    match args.get(index) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}
