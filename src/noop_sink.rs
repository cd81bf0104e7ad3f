use crate::error::SinkError;
use crate::record::LogEvent;
use crate::sink::LogSink;
use async_trait::async_trait;

/// A sink that simply drops all events.
///
/// Useful for measuring the overhead of the emit pipeline itself without
/// any external I/O, and for unit tests that don't care about delivery.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl LogSink for NoopSink {
    async fn send(&self, _event: &LogEvent) -> Result<(), SinkError> {
        Ok(())
    }
}
