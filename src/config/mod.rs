//! Layered option resolution: arguments, then environment, then defaults.

mod args;
mod builder;
mod env;
mod error;
pub mod parsers;
mod registry;
mod resolve;
mod resolved;
mod schema;
mod source;
mod value;

pub use args::{parse_args, POSITIONAL_KEY};
pub use builder::Config;
pub use env::env_snapshot;
pub use error::{AbsentValueError, BoxError, ConfigError};
pub use registry::{Parser, TypeRegistry, ValueType};
pub use resolve::resolve_schema;
pub use resolved::ResolvedConfig;
pub use schema::{OptionDecl, Schema};
pub use source::{ArgMap, EnvMap, Origin, RawSource};
pub use value::Value;
