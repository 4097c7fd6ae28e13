use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use url::Url;

use super::error::ConfigError;
use super::value::Value;

/// The result of resolving a [`Schema`](super::Schema).
///
/// Holds exactly one coerced value per schema option, in schema order. There
/// is no way to insert, remove, or modify entries once it has been built.
///
/// ```compile_fail
/// use optcast::config::{ArgMap, EnvMap};
/// use optcast::{Config, Schema, Value};
///
/// let mut config = Config::builder()
///     .with_args(ArgMap::new())
///     .with_env(EnvMap::new())
///     .resolve(&Schema::new())
///     .unwrap();
/// config.insert("extra".to_string(), Value::Bool(true));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    values: IndexMap<String, Value>,
}

impl ResolvedConfig {
    pub(crate) fn new(values: IndexMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn get_number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_number)
    }

    pub fn get_list(&self, name: &str) -> Option<&[Value]> {
        self.get(name).and_then(Value::as_list)
    }

    pub fn get_url(&self, name: &str) -> Option<&Url> {
        self.get(name).and_then(Value::as_url)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Deserializes the resolved values into a typed struct.
    ///
    /// Integral numbers deserialize into integer fields, URLs into strings,
    /// and absent values are left out so `Option` fields become `None`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let table: toml::Table = self
            .values
            .iter()
            .filter_map(|(name, value)| Some((name.clone(), value.to_toml()?)))
            .collect();

        toml::Value::Table(table)
            .try_into()
            .map_err(ConfigError::Deserialize)
    }
}

impl<'a> IntoIterator for &'a ResolvedConfig {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
