use serde::de::DeserializeOwned;

use super::args::parse_args;
use super::env::env_snapshot;
use super::error::BoxError;
use super::registry::{TypeRegistry, ValueType};
use super::resolve::resolve_schema;
use super::resolved::ResolvedConfig;
use super::schema::Schema;
use super::source::{ArgMap, EnvMap};
use super::value::Value;
use super::ConfigError;

/// Builder for resolving a [`Schema`] against arguments, environment, and defaults.
///
/// For each option the first source that has its key wins: the argument
/// map, then the environment, then the declared default. Sources that are
/// not supplied fall back to the running process: `std::env::args()` minus
/// the program name, tokenized GNU-style, and a snapshot of the environment.
///
/// Each builder owns its own [`TypeRegistry`], so parsers registered here
/// never leak into other resolutions.
///
/// ## Example
///
/// ```
/// use optcast::{Config, OptionDecl, Schema, ValueType};
///
/// let schema = Schema::new()
///     .option(
///         "port",
///         OptionDecl::new()
///             .ty(ValueType::Number)
///             .arg("port")
///             .env("PORT")
///             .default_value(3000),
///     )
///     .option("hosts", OptionDecl::new().ty(ValueType::List).env("HOSTS").required());
///
/// let config = Config::builder()
///     .with_raw_args(["--port", "8080"])
///     .with_env([("PORT", "9000"), ("HOSTS", "a.example,b.example")])
///     .resolve(&schema)?;
///
/// assert_eq!(config.get_number("port"), Some(8080.0));
/// assert_eq!(config.get_list("hosts").map(|hosts| hosts.len()), Some(2));
/// # Ok::<(), optcast::ConfigError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .resolve() or .build() is called"]
pub struct Config {
    args: Option<ArgMap>,
    env: Option<EnvMap>,
    registry: TypeRegistry,
}

impl Config {
    /// Creates a new configuration builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Uses an already tokenized argument map instead of the process arguments.
    pub fn with_args<I, K, V>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.args = Some(
            args.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Tokenizes `args` (program name excluded) and uses them as the argument map.
    pub fn with_raw_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(parse_args(args));
        self
    }

    /// Uses `env` instead of the process environment.
    pub fn with_env<I, K, V>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            env.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Registers a parser for `ty`, replacing a built-in or earlier entry.
    pub fn with_parser<F, E>(mut self, ty: impl Into<ValueType>, parser: F) -> Self
    where
        F: Fn(Value) -> Result<Value, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.registry.register(ty, parser);
        self
    }

    /// Resolves `schema`, returning the coerced values.
    pub fn resolve(self, schema: &Schema) -> Result<ResolvedConfig, ConfigError> {
        let args = self
            .args
            .unwrap_or_else(|| parse_args(std::env::args().skip(1)));
        let env = self.env.unwrap_or_else(env_snapshot);

        resolve_schema(schema, &args, &env, &self.registry)
    }

    /// Resolves `schema` and deserializes the result into `T`.
    pub fn build<T: DeserializeOwned>(self, schema: &Schema) -> Result<T, ConfigError> {
        self.resolve(schema)?.deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OptionDecl, Origin};

    #[derive(Debug, thiserror::Error)]
    #[error("whaaaaaa don't like {0}!")]
    struct CryBaby(String);

    fn some_value_schema(ty: ValueType) -> Schema {
        Schema::new().option(
            "someValue",
            OptionDecl::new().ty(ty).env("SOME_VALUE").arg("some-value"),
        )
    }

    #[test]
    fn test_pre_tokenized_args() {
        let config = Config::builder()
            .with_args([("some-value", "5")])
            .with_env(EnvMap::new())
            .resolve(&some_value_schema(ValueType::Number))
            .unwrap();

        assert_eq!(config.get_number("someValue"), Some(5.0));
    }

    #[test]
    fn test_raw_args_are_tokenized() {
        let config = Config::builder()
            .with_raw_args(["--some-value=abc"])
            .with_env(EnvMap::new())
            .resolve(&some_value_schema(ValueType::String))
            .unwrap();

        assert_eq!(config.get_str("someValue"), Some("abc"));
    }

    #[test]
    fn test_custom_parser_overlay() {
        let config = Config::builder()
            .with_args(ArgMap::new())
            .with_env([("SOME_VALUE", "blah")])
            .with_parser("shout", |v: Value| -> Result<Value, BoxError> {
                Ok(Value::from(v.stringify()?.to_uppercase()))
            })
            .resolve(&some_value_schema(ValueType::named("shout")))
            .unwrap();

        assert_eq!(config.get_str("someValue"), Some("BLAH"));
    }

    #[test]
    fn test_overlay_replaces_builtin() {
        let config = Config::builder()
            .with_args([("some-value", "7")])
            .with_env(EnvMap::new())
            .with_parser(ValueType::Number, |v: Value| {
                Ok::<_, BoxError>(Value::Number(v.to_number() * 2.0))
            })
            .resolve(&some_value_schema(ValueType::Number))
            .unwrap();

        assert_eq!(config.get_number("someValue"), Some(14.0));
    }

    #[test]
    fn test_parser_error_from_argument() {
        let err = Config::builder()
            .with_args([("some-value", "test")])
            .with_env(EnvMap::new())
            .with_parser("cry-baby", |v: Value| Err::<Value, _>(CryBaby(v.to_string())))
            .resolve(&some_value_schema(ValueType::named("cry-baby")))
            .unwrap_err();

        assert!(matches!(
            &err,
            ConfigError::ParseFailure { origin: Origin::Argument(name), .. }
                if name == "some-value"
        ));
        assert!(err.to_string().contains("whaaaaaa don't like test!"));
    }

    #[test]
    fn test_build_typed() {
        #[derive(serde::Deserialize)]
        struct Settings {
            #[serde(rename = "someValue")]
            some_value: u32,
        }

        let settings: Settings = Config::builder()
            .with_args(ArgMap::new())
            .with_env([("SOME_VALUE", "42")])
            .build(&some_value_schema(ValueType::Number))
            .unwrap();

        assert_eq!(settings.some_value, 42);
    }
}
