//! Tests of the process-global registry and the facade's degraded
//! fallback. Everything touching the global singleton lives in one test
//! function: the test harness runs functions concurrently within a binary,
//! and the registry is process state.

use std::sync::Arc;

use otel_log_sink::config::{Environment, LoggerOptions};
use otel_log_sink::error::LifecycleError;
use otel_log_sink::facade;
use otel_log_sink::level::LogLevel;
use otel_log_sink::lifecycle::{self, LifecycleState};

fn options() -> LoggerOptions {
    LoggerOptions {
        service_name: Some("svc".to_string()),
        level: Some(LogLevel::Warn),
        environment: Some(Environment::Test),
        ..Default::default()
    }
}

#[tokio::test]
async fn global_lifecycle_end_to_end() {
    let registry = lifecycle::global();
    assert_eq!(registry.state(), LifecycleState::Uninitialized);

    // Pre-initialization: getLogger is a misuse error, the facade is not.
    assert!(matches!(
        registry.logger(),
        Err(LifecycleError::NotReady {
            state: LifecycleState::Uninitialized
        })
    ));
    facade::info("visible before initialize through the degraded logger");
    assert_eq!(registry.state(), LifecycleState::Uninitialized);

    // Initialize once, then again: same logger, still ready.
    let first = registry.initialize(options()).unwrap();
    assert_eq!(registry.state(), LifecycleState::Ready);
    let second = registry.initialize(options()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let resolved = registry.logger().unwrap();
    assert!(Arc::ptr_eq(&first, &resolved));
    assert_eq!(resolved.config().service_name, "svc");
    assert_eq!(resolved.config().min_level, LogLevel::Warn);
    assert!(!resolved.config().otlp_enabled);

    // Facade forwards to the live logger now.
    facade::warn("low disk");
    facade::debug("filtered out");

    // Shutdown twice: idempotent; facade falls back again without failing.
    registry.shutdown().await;
    assert_eq!(registry.state(), LifecycleState::Shutdown);
    registry.shutdown().await;
    assert_eq!(registry.state(), LifecycleState::Shutdown);
    facade::error("still visible after shutdown");

    // A fresh initialize after shutdown replaces the sink set.
    let third = registry.initialize(options()).unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    registry.shutdown().await;

    // Test-harness reset restores the pristine state.
    registry.reset();
    assert_eq!(registry.state(), LifecycleState::Uninitialized);
}
