use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::breaker::{BreakerSnapshot, CircuitBreaker};
use crate::config::LoggerConfig;
use crate::console::{ConsoleSink, ConsoleStream, StdioConsole};
use crate::format;
use crate::level::LogLevel;
use crate::record::{LogEvent, Metadata};
use crate::sink::LogSink;

/// Dual-sink log emitter.
///
/// Every emit call runs the same pipeline: filter by severity before any
/// event is built, write the console line synchronously, then hand the
/// event to the exporter task through a bounded channel — provided the
/// circuit breaker currently admits remote attempts. The emitting caller
/// never waits on network I/O and an emit call never fails, whatever the
/// state of the collector.
pub struct Logger {
    config: LoggerConfig,
    console: Arc<dyn ConsoleSink>,
    breaker: Arc<CircuitBreaker>,
    remote: Mutex<Option<RemoteHandle>>,
    /// Total events that passed the severity filter.
    pub total_events: AtomicU64,
    /// Successfully enqueued for export.
    pub enqueued_events: AtomicU64,
    /// Dropped because the export queue was full.
    pub dropped_events: AtomicU64,
}

struct RemoteHandle {
    sender: mpsc::Sender<LogEvent>,
    worker: JoinHandle<()>,
}

impl Logger {
    /// Create a logger and, when a sink is provided, spawn the exporter
    /// task that pulls [`LogEvent`]s from a bounded channel and sends them
    /// to the collector one by one, reporting each outcome to the breaker.
    ///
    /// Must run inside a Tokio runtime when `sink` is `Some`.
    pub fn new(
        config: LoggerConfig,
        console: Arc<dyn ConsoleSink>,
        sink: Option<Arc<dyn LogSink>>,
    ) -> Self {
        let breaker = Arc::new(CircuitBreaker::new(config.breaker.clone()));

        let remote = sink.map(|sink| {
            let (tx, mut rx) = mpsc::channel::<LogEvent>(config.channel_capacity);
            let breaker_bg = Arc::clone(&breaker);

            // Exporter loop: one POST per event, outcome reported exactly
            // once. Errors stop here; the emitting caller is long gone.
            let worker = tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    match sink.send(&event).await {
                        Ok(()) => breaker_bg.record_success(),
                        Err(e) => {
                            breaker_bg.record_failure();
                            eprintln!("failed to export log record: {e}");
                        }
                    }
                }
            });

            RemoteHandle { sender: tx, worker }
        });

        Self {
            config,
            console,
            breaker,
            remote: Mutex::new(remote),
            total_events: AtomicU64::new(0),
            enqueued_events: AtomicU64::new(0),
            dropped_events: AtomicU64::new(0),
        }
    }

    /// Console-only logger with no exporter task. Safe to construct outside
    /// a Tokio runtime; used for the pre-initialization degraded path.
    pub fn console_only(config: LoggerConfig) -> Self {
        Self::new(config, Arc::new(StdioConsole), None)
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Read-only view of the breaker guarding the remote path.
    pub fn breaker_snapshot(&self) -> BreakerSnapshot {
        self.breaker.snapshot()
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.emit(LogLevel::Debug, message, None);
    }

    pub fn debug_with(&self, message: impl Into<String>, metadata: Metadata) {
        self.emit(LogLevel::Debug, message, Some(metadata));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(LogLevel::Info, message, None);
    }

    pub fn info_with(&self, message: impl Into<String>, metadata: Metadata) {
        self.emit(LogLevel::Info, message, Some(metadata));
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.emit(LogLevel::Warn, message, None);
    }

    pub fn warn_with(&self, message: impl Into<String>, metadata: Metadata) {
        self.emit(LogLevel::Warn, message, Some(metadata));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(LogLevel::Error, message, None);
    }

    pub fn error_with(&self, message: impl Into<String>, metadata: Metadata) {
        self.emit(LogLevel::Error, message, Some(metadata));
    }

    /// Alias of [`info`](Self::info) kept for call sites that use it as a
    /// distinct verb.
    pub fn success(&self, message: impl Into<String>) {
        self.emit(LogLevel::Info, message, None);
    }

    pub fn success_with(&self, message: impl Into<String>, metadata: Metadata) {
        self.emit(LogLevel::Info, message, Some(metadata));
    }

    fn emit(&self, level: LogLevel, message: impl Into<String>, metadata: Option<Metadata>) {
        // Below-threshold calls pay no formatting or allocation cost.
        if level < self.config.min_level {
            return;
        }
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let metadata = format::normalize_metadata(metadata.unwrap_or_default());
        let event = LogEvent::now(level, self.config.service_name.as_str(), message, metadata);

        if self.config.console_enabled {
            let stream = ConsoleStream::for_level(level);
            self.console.write(stream, &format::console_line(&event));
            if let Some(block) = format::metadata_block(&event.metadata) {
                self.console.write(stream, &block);
            }
        }

        // Remote path: skip entirely while the breaker refuses attempts, so
        // latency stays bounded during collector outages.
        let Ok(remote) = self.remote.lock() else {
            return;
        };
        if let Some(handle) = remote.as_ref() {
            if self.breaker.allow_attempt() {
                match handle.sender.try_send(event) {
                    Ok(()) => {
                        self.enqueued_events.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(_) => {
                        self.dropped_events.fetch_add(1, Ordering::Relaxed);
                        eprintln!("log export queue full, dropping record");
                    }
                }
            }
        }
    }

    /// Close the export channel and wait for the exporter to drain what is
    /// already queued, bounded by the configured drain timeout. Idempotent;
    /// emits issued afterwards skip the remote path silently.
    pub async fn shutdown(&self) {
        let handle = match self.remote.lock() {
            Ok(mut remote) => remote.take(),
            Err(_) => None,
        };
        let Some(RemoteHandle { sender, worker }) = handle else {
            return;
        };

        // Dropping the sender closes the channel; the worker finishes the
        // queue and exits on its own.
        drop(sender);
        if tokio::time::timeout(self.config.drain_timeout, worker)
            .await
            .is_err()
        {
            eprintln!(
                "log exporter did not drain within {:?}, leaving it detached",
                self.config.drain_timeout
            );
        }
    }
}
