use thiserror::Error;

use super::source::Origin;
use super::value::Value;

/// Boxed error returned by parsers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Listed in schema declaration order.
    #[error("Missing required config for: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    #[error("Unsupported config value type: {0}")]
    UnsupportedType(String),

    #[error("failed to parse config option '{option}' from {origin} (raw value: {raw}): {cause}")]
    ParseFailure {
        option: String,
        origin: Origin,
        raw: Value,
        #[source]
        cause: BoxError,
    },

    #[error("failed to deserialize config: {0}")]
    Deserialize(#[source] toml::de::Error),

    #[error("failed to parse schema: {0}")]
    Schema(#[source] toml::de::Error),
}

impl ConfigError {
    /// Names of the missing options, if this is a [`ConfigError::MissingRequired`].
    pub fn missing_options(&self) -> Option<&[String]> {
        match self {
            ConfigError::MissingRequired(names) => Some(names),
            _ => None,
        }
    }
}

/// Raised when stringifying [`Value::Absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot convert an absent value to a string")]
pub struct AbsentValueError;
