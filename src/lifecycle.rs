use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use crate::config::{LoggerConfig, LoggerOptions};
use crate::console::StdioConsole;
use crate::error::LifecycleError;
use crate::logger::Logger;
#[cfg(feature = "otlp")]
use crate::otlp::{OtlpConfig, OtlpSink};
use crate::sink::LogSink;

/// States of the logger singleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Ready,
    Error,
    Shutdown,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Initializing => write!(f, "initializing"),
            Self::Ready => write!(f, "ready"),
            Self::Error => write!(f, "error"),
            Self::Shutdown => write!(f, "shutdown"),
        }
    }
}

enum Phase {
    Uninitialized,
    Initializing,
    Ready(Arc<Logger>),
    Error,
    Shutdown,
}

impl Phase {
    fn state(&self) -> LifecycleState {
        match self {
            Self::Uninitialized => LifecycleState::Uninitialized,
            Self::Initializing => LifecycleState::Initializing,
            Self::Ready(_) => LifecycleState::Ready,
            Self::Error => LifecycleState::Error,
            Self::Shutdown => LifecycleState::Shutdown,
        }
    }
}

/// Single owner of the one [`Logger`] instance per process.
///
/// A fresh registry can be constructed for tests; application code goes
/// through [`global()`]. Only `Ready` makes `logger()` legal; emits before
/// that go through the facade's degraded fallback instead.
pub struct LoggerLifecycle {
    phase: Mutex<Phase>,
}

impl LoggerLifecycle {
    pub fn new() -> Self {
        Self {
            phase: Mutex::new(Phase::Uninitialized),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.phase.lock().expect("lifecycle lock poisoned").state()
    }

    /// Resolve configuration, construct the sink set and move to `Ready`.
    ///
    /// No-op returning the existing logger when already `Ready`. Fails with
    /// [`LifecycleError::InitializationInProgress`] when another initialize
    /// is in flight, and with the underlying configuration or
    /// sink-construction error (moving to `Error`) when building fails.
    ///
    /// Must run inside a Tokio runtime when the OTLP sink is enabled: it
    /// spawns the exporter task.
    pub fn initialize(&self, options: LoggerOptions) -> Result<Arc<Logger>, LifecycleError> {
        {
            let mut phase = self.phase.lock().expect("lifecycle lock poisoned");
            match &*phase {
                Phase::Ready(logger) => return Ok(Arc::clone(logger)),
                Phase::Initializing => return Err(LifecycleError::InitializationInProgress),
                _ => *phase = Phase::Initializing,
            }
        }

        match Self::build(options) {
            Ok(logger) => {
                let logger = Arc::new(logger);
                let mut phase = self.phase.lock().expect("lifecycle lock poisoned");
                *phase = Phase::Ready(Arc::clone(&logger));
                Ok(logger)
            }
            Err(e) => {
                let mut phase = self.phase.lock().expect("lifecycle lock poisoned");
                *phase = Phase::Error;
                Err(e)
            }
        }
    }

    fn build(options: LoggerOptions) -> Result<Logger, LifecycleError> {
        let config = LoggerConfig::resolve(options)?;
        let sink = Self::make_sink(&config)?;
        Ok(Logger::new(config, Arc::new(StdioConsole), sink))
    }

    #[cfg(feature = "otlp")]
    fn make_sink(config: &LoggerConfig) -> Result<Option<Arc<dyn LogSink>>, LifecycleError> {
        if !config.otlp_enabled {
            return Ok(None);
        }
        let endpoint = config
            .otlp_endpoint
            .clone()
            .ok_or(crate::error::ConfigError::MissingEndpoint)?;
        let sink = OtlpSink::new(OtlpConfig {
            endpoint,
            service_name: config.service_name.clone(),
            service_version: config.service_version.clone(),
        })?;
        Ok(Some(Arc::new(sink) as Arc<dyn LogSink>))
    }

    #[cfg(not(feature = "otlp"))]
    fn make_sink(_config: &LoggerConfig) -> Result<Option<Arc<dyn LogSink>>, LifecycleError> {
        Ok(None)
    }

    /// The live logger, or [`LifecycleError::NotReady`] outside `Ready`.
    pub fn logger(&self) -> Result<Arc<Logger>, LifecycleError> {
        let phase = self.phase.lock().expect("lifecycle lock poisoned");
        match &*phase {
            Phase::Ready(logger) => Ok(Arc::clone(logger)),
            other => Err(LifecycleError::NotReady {
                state: other.state(),
            }),
        }
    }

    /// Move to `Shutdown` and drain in-flight exports within the bounded
    /// drain timeout. Idempotent: repeated calls return immediately.
    /// Emits issued afterwards are remote no-ops.
    pub async fn shutdown(&self) {
        let logger = {
            let mut phase = self.phase.lock().expect("lifecycle lock poisoned");
            match std::mem::replace(&mut *phase, Phase::Shutdown) {
                Phase::Ready(logger) => Some(logger),
                _ => None,
            }
        };

        if let Some(logger) = logger {
            logger.shutdown().await;
        }
    }

    /// Forget the current logger and return to `Uninitialized` without
    /// draining. Test-harness hook; not part of the supported API.
    #[doc(hidden)]
    pub fn reset(&self) {
        *self.phase.lock().expect("lifecycle lock poisoned") = Phase::Uninitialized;
    }
}

impl Default for LoggerLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: OnceLock<LoggerLifecycle> = OnceLock::new();

/// Process-wide lifecycle registry backing the [`facade`](crate::facade).
pub fn global() -> &'static LoggerLifecycle {
    GLOBAL.get_or_init(LoggerLifecycle::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    fn test_options() -> LoggerOptions {
        LoggerOptions {
            environment: Some(Environment::Test),
            ..Default::default()
        }
    }

    #[test]
    fn logger_before_initialize_is_misuse() {
        let lifecycle = LoggerLifecycle::new();
        let err = lifecycle.logger().unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::NotReady {
                state: LifecycleState::Uninitialized
            }
        ));
    }

    #[test]
    fn initialize_is_idempotent() {
        let lifecycle = LoggerLifecycle::new();
        let first = lifecycle.initialize(test_options()).unwrap();
        let second = lifecycle.initialize(test_options()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(lifecycle.state(), LifecycleState::Ready);
    }

    #[test]
    fn concurrent_initialize_is_rejected() {
        let lifecycle = LoggerLifecycle::new();
        *lifecycle.phase.lock().unwrap() = Phase::Initializing;
        let err = lifecycle.initialize(test_options()).unwrap_err();
        assert!(matches!(err, LifecycleError::InitializationInProgress));
    }

    #[test]
    fn failed_initialize_moves_to_error_state() {
        let lifecycle = LoggerLifecycle::new();
        let result = lifecycle.initialize(LoggerOptions {
            service_name: Some("".into()),
            ..test_options()
        });
        assert!(result.is_err());
        assert_eq!(lifecycle.state(), LifecycleState::Error);

        // A fresh initialize after the failure is allowed.
        lifecycle.initialize(test_options()).unwrap();
        assert_eq!(lifecycle.state(), LifecycleState::Ready);
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let lifecycle = LoggerLifecycle::new();
        lifecycle.initialize(test_options()).unwrap();

        lifecycle.shutdown().await;
        assert_eq!(lifecycle.state(), LifecycleState::Shutdown);
        lifecycle.shutdown().await;
        assert_eq!(lifecycle.state(), LifecycleState::Shutdown);

        assert!(lifecycle.logger().is_err());
    }

    #[tokio::test]
    async fn initialize_after_shutdown_builds_a_fresh_logger() {
        let lifecycle = LoggerLifecycle::new();
        let first = lifecycle.initialize(test_options()).unwrap();
        lifecycle.shutdown().await;

        let second = lifecycle.initialize(test_options()).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(lifecycle.state(), LifecycleState::Ready);
    }
}
