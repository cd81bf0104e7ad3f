use crate::lifecycle::LifecycleState;

/// Error type returned when resolving a [`LoggerConfig`](crate::config::LoggerConfig).
///
/// Configuration is the only place where invalid input is fatal: these
/// errors abort `initialize()` and never occur on the emit path.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("service name must not be empty")]
    EmptyServiceName,

    #[error("otlp endpoint is required when the otlp sink is enabled")]
    MissingEndpoint,

    #[error("unknown log level: {0}")]
    UnknownLevel(String),

    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),
}

/// Error type for lifecycle misuse: calling into the singleton outside of
/// the states where the call is legal. These signal programming errors in
/// the embedding application and are the only runtime errors this crate
/// surfaces to callers.
#[derive(thiserror::Error, Debug)]
pub enum LifecycleError {
    #[error("logger is not ready (state: {state})")]
    NotReady { state: LifecycleState },

    #[error("another initialize is already in progress")]
    InitializationInProgress,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to construct remote sink: {0}")]
    Sink(#[from] SinkError),
}

/// Error type returned by a [`LogSink`](crate::sink::LogSink) transmission.
///
/// Sink errors never reach application code: the exporter task reports them
/// to the circuit breaker and prints a best-effort stderr warning.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("collector returned status {status}: {body}")]
    Http { status: u16, body: String },

    #[cfg(feature = "otlp")]
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to encode log record: {0}")]
    Encode(#[from] serde_json::Error),
}
