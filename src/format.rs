use chrono::SecondsFormat;
use serde_json::Value;

use crate::record::{LogEvent, Metadata};

/// Render the fixed console line for an event.
///
/// The layout is a stable contract consumed by log scrapers:
/// `[level:<lvl>,service:<name>,timestamp:<iso8601>]:<message>`.
pub fn console_line(event: &LogEvent) -> String {
    format!(
        "[level:{},service:{},timestamp:{}]:{}",
        event.level,
        event.service,
        event.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        event.message
    )
}

/// Render non-empty metadata as an indented JSON block for the line that
/// follows the console line. Returns `None` when there is nothing to print.
///
/// Serialization is best-effort and never propagates an error.
pub fn metadata_block(metadata: &Metadata) -> Option<String> {
    if metadata.is_empty() {
        return None;
    }
    Some(serde_json::to_string_pretty(metadata).unwrap_or_else(|_| "{}".to_string()))
}

/// Normalize error-like metadata values into plain `{name, message, stack}`
/// records before serialization.
///
/// Detection is a capability check on the value's keys rather than type
/// identity: anything exposing string `name` and `message` fields is
/// treated as an error representation.
pub fn normalize_metadata(metadata: Metadata) -> Metadata {
    metadata
        .into_iter()
        .map(|(key, value)| (key, normalize_value(value)))
        .collect()
}

fn normalize_value(value: Value) -> Value {
    match value {
        Value::Object(mut map)
            if map.get("name").map_or(false, Value::is_string)
                && map.get("message").map_or(false, Value::is_string) =>
        {
            let mut normalized = serde_json::Map::new();
            for key in ["name", "message", "stack"] {
                if let Some(v) = map.remove(key) {
                    normalized.insert(key.to_string(), v);
                }
            }
            Value::Object(normalized)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LogLevel;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn event_at_epoch(level: LogLevel, message: &str, metadata: Metadata) -> LogEvent {
        LogEvent {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap(),
            level,
            service: "svc".into(),
            message: message.into(),
            metadata,
            correlation_id: None,
        }
    }

    #[test]
    fn console_line_is_exact() {
        let event = event_at_epoch(LogLevel::Warn, "low disk", BTreeMap::new());
        assert_eq!(
            console_line(&event),
            "[level:warn,service:svc,timestamp:2024-05-01T12:30:45.000Z]:low disk"
        );
    }

    #[test]
    fn empty_metadata_renders_nothing() {
        assert_eq!(metadata_block(&BTreeMap::new()), None);
    }

    #[test]
    fn metadata_round_trips_as_json() {
        let mut metadata = Metadata::new();
        metadata.insert("a".into(), json!(1));
        metadata.insert("b".into(), json!("x"));

        let block = metadata_block(&metadata).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&block).unwrap();
        assert_eq!(parsed, json!({"a": 1, "b": "x"}));
    }

    #[test]
    fn error_like_values_are_flattened() {
        let mut metadata = Metadata::new();
        metadata.insert(
            "cause".into(),
            json!({
                "name": "TimeoutError",
                "message": "deadline exceeded",
                "stack": "TimeoutError: deadline exceeded\n  at poll",
                "request": {"url": "http://collector"}
            }),
        );

        let normalized = normalize_metadata(metadata);
        assert_eq!(
            normalized["cause"],
            json!({
                "name": "TimeoutError",
                "message": "deadline exceeded",
                "stack": "TimeoutError: deadline exceeded\n  at poll"
            })
        );
    }

    #[test]
    fn plain_objects_pass_through() {
        let mut metadata = Metadata::new();
        metadata.insert("ctx".into(), json!({"name": "job", "count": 2}));
        let normalized = normalize_metadata(metadata);
        assert_eq!(normalized["ctx"], json!({"name": "job", "count": 2}));
    }
}
