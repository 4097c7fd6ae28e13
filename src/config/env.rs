use super::source::EnvMap;

/// Snapshots the process environment.
///
/// Variables whose name or value is not valid UTF-8 are skipped.
pub fn env_snapshot() -> EnvMap {
    std::env::vars_os()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (Err(key), _) => {
                tracing::trace!(key = ?key, "skipping non-UTF-8 environment variable");
                None
            }
            (Ok(key), Err(_)) => {
                tracing::trace!(key = %key, "skipping environment variable with non-UTF-8 value");
                None
            }
        })
        .collect()
}
