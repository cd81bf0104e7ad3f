//! Environment variable names used by this crate for convenient
//! configuration of the logger from service entry points.
//!
//! These are purely helpers; the core types remain decoupled from
//! environment access.

use crate::config::{Environment, LoggerOptions};
use crate::level::LogLevel;

/// Logical service name reported in console lines and resource attributes.
pub const LOG_SERVICE_NAME_ENV: &str = "LOG_SERVICE_NAME";

/// Minimum severity, one of `debug`, `info`, `warn`, `error`.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Deployment environment, one of `development`, `production`, `test`.
pub const LOG_ENVIRONMENT_ENV: &str = "LOG_ENVIRONMENT";

/// Base URL of the OTLP/HTTP collector, e.g. `http://127.0.0.1:4318`.
pub const OTLP_ENDPOINT_ENV: &str = "OTLP_ENDPOINT";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Build [`LoggerOptions`] from the variables above.
///
/// Unset variables are left as `None` so the resolver's defaults apply;
/// unparseable level/environment values are ignored the same way rather
/// than failing startup.
pub fn options_from_env() -> LoggerOptions {
    LoggerOptions {
        service_name: std::env::var(LOG_SERVICE_NAME_ENV).ok(),
        level: std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|s| s.parse::<LogLevel>().ok()),
        environment: std::env::var(LOG_ENVIRONMENT_ENV)
            .ok()
            .and_then(|s| s.parse::<Environment>().ok()),
        otlp_endpoint: std::env::var(OTLP_ENDPOINT_ENV).ok(),
        ..Default::default()
    }
}
