//! Environment variable parsing helpers used by configuration loading.
//!
//! # Example
//!
//! ```
//! use sui_mirror_types::env_utils::{env_var, env_var_or};
//!
//! let batch: usize = env_var_or("SUI_MIRROR_BATCH_SIZE", 50);
//! let limit: Option<usize> = env_var("SUI_MIRROR_PAGE_LIMIT");
//! # let _ = (batch, limit);
//! ```

use std::str::FromStr;
use std::time::Duration;

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set or cannot be parsed.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse an environment variable with a default value.
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

/// Read a string variable, treating blank values as unset.
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a whole number of seconds as a `Duration`.
pub fn env_secs_or(key: &str, default_secs: u64) -> Duration {
    Duration::from_secs(env_var_or(key, default_secs))
}

/// Truthy values are "1", "true", "yes" and "on" (case-insensitive).
pub fn env_bool_or(key: &str, default: bool) -> bool {
    match env_string(key) {
        Some(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}
