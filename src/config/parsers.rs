//! Built-in parsers installed in every [`TypeRegistry`](super::TypeRegistry).

use url::Url;

use super::error::BoxError;
use super::value::Value;

/// Stringifies the value. Used for both the default entry and `string`.
pub fn parse_string(value: Value) -> Result<Value, BoxError> {
    match value {
        Value::String(s) => Ok(Value::String(s)),
        other => Ok(Value::String(other.stringify()?)),
    }
}

/// `true` only for the boolean `true` or the exact string `"true"`.
pub fn parse_boolean(value: Value) -> Result<Value, BoxError> {
    let b = match &value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true",
        _ => false,
    };
    Ok(Value::Bool(b))
}

/// Numeric coercion. Non-numeric input yields NaN rather than an error.
pub fn parse_number(value: Value) -> Result<Value, BoxError> {
    Ok(Value::Number(value.to_number()))
}

/// Comma-separated list. Lists pass through untouched; falsy input is empty.
pub fn parse_list(value: Value) -> Result<Value, BoxError> {
    if !value.is_truthy() {
        return Ok(Value::List(Vec::new()));
    }

    match value {
        Value::List(items) => Ok(Value::List(items)),
        other => Ok(Value::List(
            other.stringify()?.split(',').map(Value::from).collect(),
        )),
    }
}

pub fn parse_url(value: Value) -> Result<Value, BoxError> {
    match value {
        Value::Url(url) => Ok(Value::Url(url)),
        other => Ok(Value::Url(Url::parse(&other.stringify()?)?)),
    }
}
