use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::level::LogLevel;

/// Ordered metadata map attached to a log event.
pub type Metadata = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub service: String,
    pub message: String,
    pub metadata: Metadata,
    pub correlation_id: Option<String>,
}

impl LogEvent {
    /// Build an event stamped with the current time. The correlation id is
    /// lifted out of the metadata when present under `correlationId` or
    /// `correlation_id`; the key stays in the map.
    pub fn now(
        level: LogLevel,
        service: impl Into<String>,
        message: impl Into<String>,
        metadata: Metadata,
    ) -> Self {
        let correlation_id = ["correlationId", "correlation_id"]
            .iter()
            .find_map(|key| metadata.get(*key))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        LogEvent {
            timestamp: Utc::now(),
            level,
            service: service.into(),
            message: message.into(),
            metadata,
            correlation_id,
        }
    }
}
