//! The value model shared by raw sources and parser output.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, SeqAccess, Visitor};
use url::Url;

use super::error::AbsentValueError;

/// A raw or coerced configuration value.
///
/// Command-line arguments, environment variables, and schema defaults all
/// arrive as a `Value`, and every parser returns one.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value at all, e.g. an option with neither source nor default.
    #[default]
    Absent,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Url(Url),
}

impl Value {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Value::Url(url) => Some(url),
            _ => None,
        }
    }

    /// Converts the value to its textual form.
    ///
    /// Lists are joined with `,` (absent items become empty strings) and URLs
    /// render as their href. An absent value has no textual form and fails.
    pub fn stringify(&self) -> Result<String, AbsentValueError> {
        match self {
            Value::Absent => Err(AbsentValueError),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Number(n) => Ok(format_number(*n)),
            Value::String(s) => Ok(s.clone()),
            Value::List(items) => Ok(join_list(items)),
            Value::Url(url) => Ok(url.as_str().to_string()),
        }
    }

    /// Numeric coercion that never fails; unparseable input yields NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Absent => f64::NAN,
            Value::Bool(true) => 1.0,
            Value::Bool(false) => 0.0,
            Value::Number(n) => *n,
            Value::String(s) => parse_number(s),
            Value::List(items) => parse_number(&join_list(items)),
            Value::Url(url) => parse_number(url.as_str()),
        }
    }

    /// False for absent, `false`, zero, NaN and the empty string.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Absent => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::List(_) | Value::Url(_) => true,
        }
    }

    /// Converts into a TOML value for typed extraction. Absent values (and
    /// absent list items) have no TOML form and yield `None`.
    pub(crate) fn to_toml(&self) -> Option<toml::Value> {
        match self {
            Value::Absent => None,
            Value::Bool(b) => Some(toml::Value::Boolean(*b)),
            Value::Number(n) => Some(number_to_toml(*n)),
            Value::String(s) => Some(toml::Value::String(s.clone())),
            Value::List(items) => Some(toml::Value::Array(
                items.iter().filter_map(Value::to_toml).collect(),
            )),
            Value::Url(url) => Some(toml::Value::String(url.as_str().to_string())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stringify() {
            Ok(text) => f.write_str(&text),
            Err(_) => f.write_str("undefined"),
        }
    }
}

fn join_list(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| item.stringify().unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",")
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 {
        // -0 prints as 0
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        exponent_form(n)
    } else {
        n.to_string()
    }
}

/// Formats `n` as `1.5e+21` / `1.5e-7`: shortest digits, signed exponent.
fn exponent_form(n: f64) -> String {
    let formatted = format!("{n:e}");
    match formatted.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => formatted,
    }
}

fn parse_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return f64::NAN;
            }
            // no u64 bound: wide literals round like any large f64
            return digits
                .chars()
                .filter_map(|c| c.to_digit(radix))
                .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(d));
        }
    }

    // `str::parse::<f64>` also accepts "inf" and "nan", which are not numbers here
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }

    s.parse().unwrap_or(f64::NAN)
}

fn number_to_toml(n: f64) -> toml::Value {
    const I64_RANGE: f64 = 9_223_372_036_854_775_808.0;
    if n.is_finite() && n.fract() == 0.0 && n.abs() < I64_RANGE {
        toml::Value::Integer(n as i64)
    } else {
        toml::Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Url> for Value {
    fn from(url: Url) -> Self {
        Value::Url(url)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Absent, Into::into)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean, number, string, or list")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Absent)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Absent)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }
}
