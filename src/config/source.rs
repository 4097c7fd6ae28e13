use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

use indexmap::IndexMap;

use super::value::Value;

/// Tokenized command-line arguments, keyed by flag name.
pub type ArgMap = IndexMap<String, Value>;

/// Environment variables, keyed by variable name.
pub type EnvMap = IndexMap<String, String>;

/// Where the raw value for an option came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Command-line argument, with the flag name that matched.
    Argument(String),
    /// Environment variable, with the variable name that matched.
    Environment(String),
    /// The schema's declared default (or the absent value when none is declared).
    Default,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Argument(name) => write!(f, "argument '{name}'"),
            Origin::Environment(name) => write!(f, "environment variable '{name}'"),
            Origin::Default => f.write_str("default value"),
        }
    }
}

/// A read-only map of raw values consulted by the resolver.
///
/// Presence is structural: a key that exists with an empty value is still
/// present and wins over lower-precedence sources.
pub trait RawSource {
    fn lookup(&self, key: &str) -> Option<Value>;
}

impl<V, S> RawSource for IndexMap<String, V, S>
where
    V: Clone + Into<Value>,
    S: BuildHasher,
{
    fn lookup(&self, key: &str) -> Option<Value> {
        self.get(key).cloned().map(Into::into)
    }
}

impl<V, S> RawSource for HashMap<String, V, S>
where
    V: Clone + Into<Value>,
    S: BuildHasher,
{
    fn lookup(&self, key: &str) -> Option<Value> {
        self.get(key).cloned().map(Into::into)
    }
}

impl<V> RawSource for BTreeMap<String, V>
where
    V: Clone + Into<Value>,
{
    fn lookup(&self, key: &str) -> Option<Value> {
        self.get(key).cloned().map(Into::into)
    }
}

impl<T: RawSource + ?Sized> RawSource for &T {
    fn lookup(&self, key: &str) -> Option<Value> {
        (**self).lookup(key)
    }
}
