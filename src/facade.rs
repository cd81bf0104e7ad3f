//! Module-level logging facade.
//!
//! Every call re-resolves the lifecycle registry's current logger instead
//! of caching it at first use, so late initialization is tolerated. Before
//! the singleton reaches `Ready` (or after shutdown) calls fall back to a
//! degraded console-only logger with default configuration: anything logged
//! that early stays visible and never fails.

use std::sync::OnceLock;

use crate::config::{LoggerConfig, LoggerOptions};
use crate::lifecycle;
use crate::logger::Logger;
use crate::record::Metadata;

fn degraded() -> &'static Logger {
    static DEGRADED: OnceLock<Logger> = OnceLock::new();
    DEGRADED.get_or_init(|| {
        let config = LoggerConfig::resolve(LoggerOptions {
            enable_otlp: Some(false),
            ..Default::default()
        })
        .expect("default console-only configuration is valid");
        Logger::console_only(config)
    })
}

fn with_logger(f: impl FnOnce(&Logger)) {
    match lifecycle::global().logger() {
        Ok(logger) => f(&logger),
        Err(_) => f(degraded()),
    }
}

pub fn debug(message: impl Into<String>) {
    with_logger(|l| l.debug(message));
}

pub fn debug_with(message: impl Into<String>, metadata: Metadata) {
    with_logger(|l| l.debug_with(message, metadata));
}

pub fn info(message: impl Into<String>) {
    with_logger(|l| l.info(message));
}

pub fn info_with(message: impl Into<String>, metadata: Metadata) {
    with_logger(|l| l.info_with(message, metadata));
}

pub fn warn(message: impl Into<String>) {
    with_logger(|l| l.warn(message));
}

pub fn warn_with(message: impl Into<String>, metadata: Metadata) {
    with_logger(|l| l.warn_with(message, metadata));
}

pub fn error(message: impl Into<String>) {
    with_logger(|l| l.error(message));
}

pub fn error_with(message: impl Into<String>, metadata: Metadata) {
    with_logger(|l| l.error_with(message, metadata));
}

/// Alias of [`info`] kept for call sites that use it as a distinct verb.
pub fn success(message: impl Into<String>) {
    with_logger(|l| l.success(message));
}

pub fn success_with(message: impl Into<String>, metadata: Metadata) {
    with_logger(|l| l.success_with(message, metadata));
}
