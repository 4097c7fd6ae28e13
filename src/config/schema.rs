//! Option declarations.

use indexmap::IndexMap;
use serde::Deserialize;

use super::error::ConfigError;
use super::registry::ValueType;
use super::value::Value;

/// How a single option is sourced and typed.
///
/// `default` distinguishes "no default declared" (`None`) from "default
/// declared as the absent value" (`Some(Value::Absent)`). Only the former
/// lets a `required` option be reported as missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionDecl {
    /// Parser to apply; `None` selects the `default` registry entry.
    #[serde(rename = "type", default)]
    pub ty: Option<ValueType>,
    /// Key looked up in the argument map.
    #[serde(default, alias = "cmdLineArgName")]
    pub arg: Option<String>,
    /// Key looked up in the environment map.
    #[serde(default, alias = "envVariableName")]
    pub env: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, alias = "defaultValue")]
    pub default: Option<Value>,
}

impl OptionDecl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ty(mut self, ty: impl Into<ValueType>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    pub fn arg(mut self, name: impl Into<String>) -> Self {
        self.arg = Some(name.into());
        self
    }

    pub fn env(mut self, name: impl Into<String>) -> Self {
        self.env = Some(name.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// An ordered mapping from option name to its declaration.
///
/// Resolution visits options in insertion order, which also fixes the order
/// of names in a missing-required error.
///
/// ```
/// use optcast::{OptionDecl, Schema, ValueType};
///
/// let schema = Schema::new()
///     .option("port", OptionDecl::new().ty(ValueType::Number).env("PORT").default_value(8080))
///     .option("debug", OptionDecl::new().ty(ValueType::Boolean).arg("debug"));
///
/// assert_eq!(schema.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    options: IndexMap<String, OptionDecl>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn option(mut self, name: impl Into<String>, decl: OptionDecl) -> Self {
        self.insert(name, decl);
        self
    }

    /// Adds or replaces an option. A replaced option keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, decl: OptionDecl) {
        self.options.insert(name.into(), decl);
    }

    pub fn get(&self, name: &str) -> Option<&OptionDecl> {
        self.options.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionDecl)> {
        self.options.iter().map(|(name, decl)| (name.as_str(), decl))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Parses a schema declared as a TOML document, one table per option:
    ///
    /// ```toml
    /// [port]
    /// type = "number"
    /// env = "PORT"
    /// default = 8080
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Schema)
    }
}

impl<K: Into<String>> FromIterator<(K, OptionDecl)> for Schema {
    fn from_iter<I: IntoIterator<Item = (K, OptionDecl)>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for (name, decl) in iter {
            schema.insert(name, decl);
        }
        schema
    }
}
