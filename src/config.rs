use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::level::LogLevel;

/// Default upper bound on how long `shutdown()` waits for queued exports.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Deployment environment the logger runs in.
///
/// `Test` forces the OTLP sink off unless explicitly re-enabled, so unit
/// tests never open network connections by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// Tuning for the circuit breaker guarding the OTLP sink.
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Consecutive failures before the breaker opens.
    pub failure_threshold: u32,
    /// How long the breaker stays open before probing again.
    pub reset_timeout: Duration,
    /// Consecutive half-open successes required to close the breaker.
    pub success_threshold: u32,
}

impl Default for BreakerConfig {
    /// Defaults: `failure_threshold = 5`, `reset_timeout = 30s`,
    /// `success_threshold = 3`.
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(30),
            success_threshold: 3,
        }
    }
}

/// Named options accepted by [`LoggerConfig::resolve`] and
/// [`initialize`](crate::lifecycle::LoggerLifecycle::initialize).
///
/// Every field is optional; unset fields fall back to the documented
/// defaults. `enable_otlp` left unset means "on outside the `Test`
/// environment".
#[derive(Debug, Clone, Default)]
pub struct LoggerOptions {
    pub service_name: Option<String>,
    pub service_version: Option<String>,
    pub level: Option<LogLevel>,
    pub environment: Option<Environment>,
    pub enable_console: Option<bool>,
    pub enable_otlp: Option<bool>,
    pub otlp_endpoint: Option<String>,
    pub breaker: Option<BreakerConfig>,
    /// Maximum number of records queued for export before new ones drop.
    pub channel_capacity: Option<usize>,
    /// Upper bound on how long `shutdown()` waits for in-flight exports.
    pub drain_timeout: Option<Duration>,
}

/// Resolved, validated logger configuration.
///
/// Created once during `initialize()`; immutable for the life of the
/// singleton and replaced only by a fresh `initialize()` after `shutdown()`.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub service_name: String,
    pub service_version: String,
    pub min_level: LogLevel,
    pub environment: Environment,
    pub console_enabled: bool,
    pub otlp_enabled: bool,
    pub otlp_endpoint: Option<String>,
    pub breaker: BreakerConfig,
    pub channel_capacity: usize,
    pub drain_timeout: Duration,
}

impl LoggerConfig {
    /// Resolve named options into a validated configuration.
    ///
    /// **Defaults**
    /// - `service_name = "task-manager"`
    /// - `service_version` = this crate's version
    /// - `min_level = info`
    /// - `console_enabled = true`
    /// - `otlp_enabled = true` outside the `Test` environment, `false` in it
    /// - breaker: [`BreakerConfig::default`]
    /// - `channel_capacity = 1024`, `drain_timeout = 5s`
    ///
    /// **Errors**
    /// - [`ConfigError::EmptyServiceName`] when the service name is blank.
    /// - [`ConfigError::MissingEndpoint`] when the OTLP sink is enabled but
    ///   no endpoint was provided (or it is blank).
    pub fn resolve(options: LoggerOptions) -> Result<Self, ConfigError> {
        let environment = options.environment.unwrap_or_default();
        let service_name = options
            .service_name
            .unwrap_or_else(|| "task-manager".to_string());
        if service_name.trim().is_empty() {
            return Err(ConfigError::EmptyServiceName);
        }

        let otlp_enabled = options
            .enable_otlp
            .unwrap_or(environment != Environment::Test);

        let otlp_endpoint = options
            .otlp_endpoint
            .filter(|e| !e.trim().is_empty())
            .map(|e| e.trim_end_matches('/').to_string());
        if otlp_enabled && otlp_endpoint.is_none() {
            return Err(ConfigError::MissingEndpoint);
        }

        // Floor the capacity to keep the exporter channel from degenerating,
        // same guard the export loop had for its buffer.
        let channel_capacity = options.channel_capacity.unwrap_or(1024).max(16);

        Ok(LoggerConfig {
            service_name,
            service_version: options
                .service_version
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            min_level: options.level.unwrap_or(LogLevel::Info),
            environment,
            console_enabled: options.enable_console.unwrap_or(true),
            otlp_enabled,
            otlp_endpoint,
            breaker: options.breaker.unwrap_or_default(),
            channel_capacity,
            drain_timeout: options.drain_timeout.unwrap_or(DEFAULT_DRAIN_TIMEOUT),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve() {
        let cfg = LoggerConfig::resolve(LoggerOptions {
            otlp_endpoint: Some("http://localhost:4318".into()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(cfg.service_name, "task-manager");
        assert_eq!(cfg.min_level, LogLevel::Info);
        assert!(cfg.console_enabled);
        assert!(cfg.otlp_enabled);
        assert_eq!(cfg.breaker.failure_threshold, 5);
        assert_eq!(cfg.breaker.reset_timeout, Duration::from_secs(30));
    }

    #[test]
    fn blank_service_name_is_fatal() {
        let err = LoggerConfig::resolve(LoggerOptions {
            service_name: Some("   ".into()),
            enable_otlp: Some(false),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyServiceName));
    }

    #[test]
    fn otlp_without_endpoint_is_fatal() {
        let err = LoggerConfig::resolve(LoggerOptions {
            enable_otlp: Some(true),
            otlp_endpoint: Some("  ".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEndpoint));
    }

    #[test]
    fn test_environment_forces_otlp_off() {
        let cfg = LoggerConfig::resolve(LoggerOptions {
            environment: Some(Environment::Test),
            ..Default::default()
        })
        .unwrap();
        assert!(!cfg.otlp_enabled);
    }

    #[test]
    fn explicit_enable_overrides_test_environment() {
        let cfg = LoggerConfig::resolve(LoggerOptions {
            environment: Some(Environment::Test),
            enable_otlp: Some(true),
            otlp_endpoint: Some("http://localhost:4318/".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(cfg.otlp_enabled);
        assert_eq!(cfg.otlp_endpoint.as_deref(), Some("http://localhost:4318"));
    }
}
