//! Resolve a typed configuration from command-line arguments, environment
//! variables, and schema defaults.
//!
//! ```
//! use optcast::{Config, OptionDecl, Schema, ValueType};
//!
//! let schema = Schema::new()
//!     .option("debug", OptionDecl::new().ty(ValueType::Boolean).arg("debug").env("DEBUG"))
//!     .option("name", OptionDecl::new().env("APP_NAME").default_value("demo"));
//!
//! let config = Config::builder()
//!     .with_raw_args(["--debug"])
//!     .with_env([("DEBUG", "false")])
//!     .resolve(&schema)?;
//!
//! assert_eq!(config.get_bool("debug"), Some(true));
//! assert_eq!(config.get_str("name"), Some("demo"));
//! # Ok::<(), optcast::ConfigError>(())
//! ```

pub mod config;

pub use config::{
    Config, ConfigError, OptionDecl, Origin, ResolvedConfig, Schema, TypeRegistry, Value,
    ValueType,
};

/// Resolves `schema` against the process arguments and environment using
/// only the built-in parsers.
pub fn resolve(schema: &Schema) -> Result<ResolvedConfig, ConfigError> {
    Config::builder().resolve(schema)
}
