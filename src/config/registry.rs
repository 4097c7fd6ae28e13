//! Type identifiers and the per-resolution parser table.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use super::error::{BoxError, ConfigError};
use super::parsers;
use super::source::Origin;
use super::value::Value;

/// Identifies which parser coerces an option's raw value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum ValueType {
    /// The fallback entry, used when an option declares no type.
    Default,
    String,
    Boolean,
    Number,
    List,
    Url,
    /// A caller-defined type; needs a registered parser.
    Custom(String),
}

impl ValueType {
    /// Looks up a type by name. Built-in names map to their variants.
    pub fn named(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        match name {
            "default" => ValueType::Default,
            "string" => ValueType::String,
            "boolean" | "bool" => ValueType::Boolean,
            "number" => ValueType::Number,
            "list" | "array" | "string-list" => ValueType::List,
            "url" | "uri" => ValueType::Url,
            _ => ValueType::Custom(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ValueType::Default => "default",
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::List => "list",
            ValueType::Url => "url",
            ValueType::Custom(name) => name,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ValueType::named(s))
    }
}

impl From<&str> for ValueType {
    fn from(name: &str) -> Self {
        ValueType::named(name)
    }
}

impl From<String> for ValueType {
    fn from(name: String) -> Self {
        ValueType::named(name)
    }
}

/// A coercion function from a raw value to a typed value.
pub type Parser = Arc<dyn Fn(Value) -> Result<Value, BoxError> + Send + Sync>;

/// Maps type identifiers to parsers.
///
/// Every registry starts as a copy of the built-in table; [`register`](Self::register)
/// only touches this copy, so registries built for different resolutions never
/// observe each other's overlays. The `default` entry may be replaced but is
/// never removed.
#[derive(Clone)]
pub struct TypeRegistry {
    parsers: HashMap<ValueType, Parser>,
}

impl TypeRegistry {
    /// Creates a registry holding only the built-in parsers.
    pub fn new() -> Self {
        let mut table: HashMap<ValueType, Parser> = HashMap::new();
        table.insert(ValueType::Default, Arc::new(parsers::parse_string));
        table.insert(ValueType::String, Arc::new(parsers::parse_string));
        table.insert(ValueType::Boolean, Arc::new(parsers::parse_boolean));
        table.insert(ValueType::Number, Arc::new(parsers::parse_number));
        table.insert(ValueType::List, Arc::new(parsers::parse_list));
        table.insert(ValueType::Url, Arc::new(parsers::parse_url));
        Self { parsers: table }
    }

    /// Registers `parser` for `ty`, replacing any existing entry.
    pub fn register<F, E>(&mut self, ty: impl Into<ValueType>, parser: F) -> &mut Self
    where
        F: Fn(Value) -> Result<Value, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let ty = ty.into();
        tracing::trace!(value_type = %ty, "registering parser");
        let entry: Parser = Arc::new(move |value: Value| -> Result<Value, BoxError> {
            parser(value).map_err(Into::into)
        });
        self.parsers.insert(ty, entry);
        self
    }

    /// Consuming variant of [`register`](Self::register).
    pub fn with_parser<F, E>(mut self, ty: impl Into<ValueType>, parser: F) -> Self
    where
        F: Fn(Value) -> Result<Value, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.register(ty, parser);
        self
    }

    pub fn contains(&self, ty: &ValueType) -> bool {
        self.parsers.contains_key(ty)
    }

    /// Returns the parser for `ty`, or the `default` entry when `ty` is `None`.
    pub fn lookup(&self, ty: Option<&ValueType>) -> Result<&Parser, ConfigError> {
        let ty = ty.unwrap_or(&ValueType::Default);
        self.parsers
            .get(ty)
            .ok_or_else(|| ConfigError::UnsupportedType(ty.name().to_string()))
    }

    /// Coerces `raw` for `option`, attributing any parser failure to `origin`.
    ///
    /// Parsers take their input by value and drop it on failure, so `raw` is
    /// cloned up front to keep it for [`ConfigError::ParseFailure`]. Raw
    /// values are single tokens or short lists, so the copy is one small
    /// allocation per option.
    pub fn cast(
        &self,
        option: &str,
        origin: Origin,
        raw: Value,
        ty: Option<&ValueType>,
    ) -> Result<Value, ConfigError> {
        let parser = self.lookup(ty)?;
        parser(raw.clone()).map_err(|cause| ConfigError::ParseFailure {
            option: option.to_string(),
            origin,
            raw,
            cause,
        })
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.parsers.keys().map(ValueType::name).collect();
        names.sort_unstable();
        f.debug_struct("TypeRegistry").field("types", &names).finish()
    }
}
