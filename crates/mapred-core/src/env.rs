//! Environment variable utilities
//!
//! Generic `env_get<T>` parsing with defaults, used by driver-side
//! configuration (`EngineConfig::from_env`) and the log setup. The engine
//! itself never reads the environment.

use std::str::FromStr;

/// Get an environment variable as an optional value.
///
/// `Some(T)` if set and parsable, `None` otherwise.
#[inline]
pub fn env_get_opt<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Get an environment variable parsed as `T`, or return the default.
///
/// Works with any type that implements `FromStr`; unset or unparsable
/// values fall back silently.
///
/// ```ignore
/// let workers: usize = env_get("MR_NUM_WORKERS", 5);
/// ```
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    env_get_opt(key).unwrap_or(default)
}

/// Get an environment variable as a boolean.
///
/// Accepts "1", "true", "yes", "on" (case-insensitive) as true; any other
/// set value is false, unset returns the default.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}
