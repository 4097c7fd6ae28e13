//! Resolution of a schema against layered raw sources.
//!
//! Each option takes its raw value from the first source that has its key:
//! command-line argument, then environment variable, then declared default.

use indexmap::IndexMap;

use super::registry::TypeRegistry;
use super::resolved::ResolvedConfig;
use super::schema::{OptionDecl, Schema};
use super::source::{Origin, RawSource};
use super::value::Value;
use super::ConfigError;

/// Resolves every option in `schema` and coerces it through `registry`.
///
/// Required options with no argument, environment, or declared default are
/// collected and reported together once the whole schema has been visited.
/// Any coercion failure aborts immediately, so options declared after the
/// failing one are never coerced.
pub fn resolve_schema(
    schema: &Schema,
    args: &impl RawSource,
    env: &impl RawSource,
    registry: &TypeRegistry,
) -> Result<ResolvedConfig, ConfigError> {
    let mut values = IndexMap::with_capacity(schema.len());
    let mut missing = Vec::new();

    for (name, decl) in schema.iter() {
        let Some((origin, raw)) = select_raw(decl, args, env) else {
            tracing::debug!(option = name, "required config option has no value");
            missing.push(name.to_string());
            continue;
        };

        tracing::trace!(option = name, origin = %origin, "coercing config option");
        let value = registry
            .cast(name, origin, raw, decl.ty.as_ref())
            .inspect_err(|e| log_cast_failure(name, e))?;
        values.insert(name.to_string(), value);
    }

    if !missing.is_empty() {
        return Err(ConfigError::MissingRequired(missing));
    }

    tracing::debug!(options = values.len(), "resolved config");
    Ok(ResolvedConfig::new(values))
}

/// Logs a coercion failure without the raw value, which may be a secret.
fn log_cast_failure(option: &str, err: &ConfigError) {
    match err {
        ConfigError::ParseFailure { origin, cause, .. } => {
            tracing::debug!(
                option,
                origin = %origin,
                cause = %cause,
                "config option failed to coerce"
            );
        }
        other => tracing::debug!(option, error = %other, "config option failed to coerce"),
    }
}

/// Picks the raw value for one option, or `None` if it is required and unset.
fn select_raw(
    decl: &OptionDecl,
    args: &impl RawSource,
    env: &impl RawSource,
) -> Option<(Origin, Value)> {
    if let Some(key) = &decl.arg {
        if let Some(raw) = args.lookup(key) {
            return Some((Origin::Argument(key.clone()), raw));
        }
    }

    if let Some(key) = &decl.env {
        if let Some(raw) = env.lookup(key) {
            return Some((Origin::Environment(key.clone()), raw));
        }
    }

    match &decl.default {
        None if decl.required => None,
        // An undeclared default on an optional option is still coerced as absent
        default => Some((Origin::Default, default.clone().unwrap_or_default())),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::config::{ArgMap, BoxError, EnvMap, ValueType};

    fn example_schema() -> Schema {
        Schema::new()
            .option(
                "testOption",
                OptionDecl::new()
                    .ty(ValueType::String)
                    .arg("test-option")
                    .env("TEST_OPTION")
                    .default_value("defaultValue"),
            )
            .option(
                "anotherTestOption",
                OptionDecl::new()
                    .ty(ValueType::Number)
                    .arg("another-test-option")
                    .env("ANOTHER_TEST_OPTION")
                    .default_value(42),
            )
    }

    fn required_schema() -> Schema {
        Schema::new()
            .option(
                "testOption",
                OptionDecl::new()
                    .ty(ValueType::String)
                    .arg("test-option")
                    .env("TEST_OPTION")
                    .required(),
            )
            .option(
                "anotherTestOption",
                OptionDecl::new()
                    .ty(ValueType::Number)
                    .arg("another-test-option")
                    .env("ANOTHER_TEST_OPTION")
                    .required(),
            )
    }

    fn args(pairs: &[(&str, &str)]) -> ArgMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    fn env(pairs: &[(&str, &str)]) -> EnvMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Resolves `schema` with empty sources and only the built-in parsers.
    fn resolve_without_sources(schema: &Schema) -> Result<ResolvedConfig, ConfigError> {
        resolve_schema(schema, &ArgMap::new(), &EnvMap::new(), &TypeRegistry::new())
    }

    type Calls = Arc<Mutex<Vec<(String, Value)>>>;

    /// Registry whose string and number parsers record every input they see.
    fn recording_registry() -> (TypeRegistry, Calls) {
        let calls: Calls = Arc::default();
        let mut registry = TypeRegistry::new();
        for ty in [ValueType::String, ValueType::Number] {
            let calls = Arc::clone(&calls);
            let name = ty.name().to_string();
            registry.register(ty, move |value: Value| {
                calls.lock().unwrap().push((name.clone(), value.clone()));
                Ok::<_, BoxError>(Value::from(format!("cast-{name}-{value}")))
            });
        }
        (registry, calls)
    }

    #[test]
    fn test_every_option_present() {
        let config = resolve_without_sources(&example_schema()).unwrap();

        assert!(config.contains_key("testOption"));
        assert!(config.contains_key("anotherTestOption"));
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn test_missing_required_aggregated_in_order() {
        let err = resolve_without_sources(&required_schema()).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Missing required config for: testOption, anotherTestOption"
        );
        assert_eq!(
            err.missing_options(),
            Some(&["testOption".to_string(), "anotherTestOption".to_string()][..])
        );
    }

    #[test]
    fn test_required_satisfied_by_mixed_sources() {
        let (registry, calls) = recording_registry();
        let config = resolve_schema(
            &required_schema(),
            &args(&[("test-option", "blah")]),
            &env(&[("TEST_OPTION", "meh"), ("ANOTHER_TEST_OPTION", "1234")]),
            &registry,
        )
        .unwrap();

        assert_eq!(config.get_str("testOption"), Some("cast-string-blah"));
        assert_eq!(config.get_str("anotherTestOption"), Some("cast-number-1234"));
        // env value for testOption is never handed to a parser
        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                ("string".to_string(), Value::from("blah")),
                ("number".to_string(), Value::from("1234")),
            ]
        );
    }

    #[test]
    fn test_args_cast_to_declared_type() {
        let (registry, calls) = recording_registry();
        let config = resolve_schema(
            &example_schema(),
            &args(&[("test-option", "testCliValue"), ("another-test-option", "52")]),
            &EnvMap::new(),
            &registry,
        )
        .unwrap();

        assert_eq!(calls.lock().unwrap().len(), 2);
        assert_eq!(config.get_str("testOption"), Some("cast-string-testCliValue"));
        assert_eq!(config.get_str("anotherTestOption"), Some("cast-number-52"));
    }

    #[test]
    fn test_env_used_without_args() {
        let config = resolve_schema(
            &example_schema(),
            &ArgMap::new(),
            &env(&[("TEST_OPTION", "testEnvValue"), ("ANOTHER_TEST_OPTION", "48")]),
            &TypeRegistry::new(),
        )
        .unwrap();

        assert_eq!(config.get_str("testOption"), Some("testEnvValue"));
        assert_eq!(config.get_number("anotherTestOption"), Some(48.0));
    }

    #[test]
    fn test_args_take_precedence_over_env() {
        let config = resolve_schema(
            &example_schema(),
            &args(&[("test-option", "testCliValue"), ("another-test-option", "52")]),
            &env(&[("TEST_OPTION", "testEnvValue"), ("ANOTHER_TEST_OPTION", "48")]),
            &TypeRegistry::new(),
        )
        .unwrap();

        assert_eq!(config.get_str("testOption"), Some("testCliValue"));
        assert_eq!(config.get_number("anotherTestOption"), Some(52.0));
    }

    #[test]
    fn test_defaults_used_without_sources() {
        let (registry, calls) = recording_registry();
        let config =
            resolve_schema(&example_schema(), &ArgMap::new(), &EnvMap::new(), &registry).unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                ("string".to_string(), Value::from("defaultValue")),
                ("number".to_string(), Value::Number(42.0)),
            ]
        );
        assert_eq!(config.get_str("testOption"), Some("cast-string-defaultValue"));
    }

    #[test]
    fn test_empty_argument_wins() {
        let config = resolve_schema(
            &example_schema(),
            &args(&[("test-option", "")]),
            &env(&[("TEST_OPTION", "from-env")]),
            &TypeRegistry::new(),
        )
        .unwrap();

        assert_eq!(config.get_str("testOption"), Some(""));
    }

    #[test]
    fn test_required_with_default_is_not_missing() {
        let schema = Schema::new().option(
            "someValue",
            OptionDecl::new()
                .ty(ValueType::Number)
                .env("SOME_VALUE")
                .required()
                .default_value(123),
        );

        let config = resolve_without_sources(&schema).unwrap();
        assert_eq!(config.get_number("someValue"), Some(123.0));
    }

    #[test]
    fn test_optional_without_default_coerces_absent() {
        let schema = Schema::new()
            .option("flag", OptionDecl::new().ty(ValueType::Boolean).arg("flag"))
            .option("name", OptionDecl::new().ty(ValueType::String).env("NAME"));

        let err = resolve_without_sources(&schema).unwrap_err();

        match err {
            ConfigError::ParseFailure { option, origin, raw, .. } => {
                assert_eq!(option, "name");
                assert_eq!(origin, Origin::Default);
                assert_eq!(raw, Value::Absent);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_type_stops_before_later_options() {
        // Options are coerced in schema order: `first` is coerced, `broken`
        // fails, and `last` is never reached.
        let (registry, calls) = recording_registry();
        let schema = Schema::new()
            .option("first", OptionDecl::new().ty(ValueType::String).default_value("a"))
            .option("broken", OptionDecl::new().ty("X").default_value("b"))
            .option("last", OptionDecl::new().ty(ValueType::String).default_value("c"));

        let err = resolve_schema(&schema, &ArgMap::new(), &EnvMap::new(), &registry).unwrap_err();

        assert!(matches!(err, ConfigError::UnsupportedType(ref name) if name == "X"));
        assert_eq!(*calls.lock().unwrap(), vec![("string".to_string(), Value::from("a"))]);
    }

    #[test]
    fn test_coercion_failure_wins_over_missing() {
        let schema = Schema::new()
            .option("missing", OptionDecl::new().required())
            .option("broken", OptionDecl::new().ty("X").default_value("b"));

        let err = resolve_without_sources(&schema).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedType(_)));
    }

    #[test]
    fn test_sources_are_not_modified() {
        let argv = args(&[("test-option", "x")]);
        let environment = env(&[("ANOTHER_TEST_OPTION", "7")]);
        let (argv_before, env_before) = (argv.clone(), environment.clone());

        resolve_schema(&example_schema(), &argv, &environment, &TypeRegistry::new()).unwrap();

        assert_eq!(argv, argv_before);
        assert_eq!(environment, env_before);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_coercion_failure_log_omits_raw_value() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .finish();

        let schema = Schema::new().option(
            "apiToken",
            OptionDecl::new().ty("token").env("API_TOKEN").required(),
        );
        let mut registry = TypeRegistry::new();
        registry.register("token", |_: Value| {
            Err::<Value, BoxError>("token is not in the expected format".into())
        });

        let err = tracing::subscriber::with_default(subscriber, || {
            resolve_schema(
                &schema,
                &ArgMap::new(),
                &env(&[("API_TOKEN", "hunter2-SECRET")]),
                &registry,
            )
            .unwrap_err()
        });

        // the error itself still carries the raw value for the caller
        assert!(matches!(
            &err,
            ConfigError::ParseFailure { raw, .. } if raw == &Value::from("hunter2-SECRET")
        ));

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("config option failed to coerce"));
        assert!(output.contains("token is not in the expected format"));
        assert!(output.contains("API_TOKEN"));
        assert!(!output.contains("hunter2-SECRET"));
    }
}
