use crate::error::SinkError;
use crate::record::LogEvent;
use async_trait::async_trait;

/// Asynchronous destination for [`LogEvent`]s on the remote path.
///
/// Implementations are responsible for transporting one event to a concrete
/// collector (OTLP/HTTP, a test double, etc). The logger calls `send` from
/// its exporter task and never awaits it on the emitting call path.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Send a single log event to the underlying collector.
    ///
    /// **Parameters**
    /// - `event`: fully-populated [`LogEvent`] produced by the logger core.
    ///
    /// **Returns**
    /// - `Ok(())` if the event was accepted by the collector.
    /// - `Err(..)` on network error, timeout, non-success HTTP status or
    ///   encoding failure. The exporter task reports each outcome to the
    ///   circuit breaker exactly once; an error is never retried for the
    ///   same event and never reaches the emitting caller.
    ///
    /// Implementations should be non-blocking and use async I/O under the
    /// hood.
    async fn send(&self, event: &LogEvent) -> Result<(), SinkError>;

    /// Flush any buffered events, if the collector client buffers.
    ///
    /// Default implementation is a no-op.
    async fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}
