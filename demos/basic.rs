use serde_json::json;

use otel_log_sink::config::{Environment, LoggerOptions};
use otel_log_sink::facade;
use otel_log_sink::lifecycle;
use otel_log_sink::record::Metadata;

#[tokio::main]
async fn main() {
    // Anything logged before initialize still prints through the degraded
    // console-only fallback.
    facade::info("starting up");

    let options = LoggerOptions {
        service_name: Some("demo".to_string()),
        environment: Some(Environment::Development),
        otlp_endpoint: Some("http://127.0.0.1:4318".to_string()),
        ..Default::default()
    };
    let logger = lifecycle::global()
        .initialize(options)
        .expect("initialize logger");

    facade::debug("below the default threshold, not printed");
    facade::info("worker pool started");
    facade::success("migration applied");

    let mut metadata = Metadata::new();
    metadata.insert("available".to_string(), json!("10MB"));
    metadata.insert("path".to_string(), json!("/var/lib/tasks"));
    facade::warn_with("low disk", metadata);

    let mut failure = Metadata::new();
    failure.insert(
        "cause".to_string(),
        json!({"name": "TimeoutError", "message": "deadline exceeded"}),
    );
    facade::error_with("task runner crashed", failure);

    let snapshot = logger.breaker_snapshot();
    println!(
        "breaker: state={} consecutive_failures={}",
        snapshot.state, snapshot.consecutive_failures
    );

    lifecycle::global().shutdown().await;
}
