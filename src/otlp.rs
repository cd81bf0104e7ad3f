use crate::error::SinkError;
use crate::record::LogEvent;
use crate::sink::LogSink;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Total per-request timeout enforced by the HTTP client. A timed-out
/// export counts as one breaker failure like any other transport error.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`OtlpSink`].
///
/// The sink talks to an OTLP/HTTP log collector, posting one protojson
/// export request per event to `<endpoint>/v1/logs`.
#[derive(Clone, Debug)]
pub struct OtlpConfig {
    /// Base URL without the signal path, e.g. "http://127.0.0.1:4318".
    pub endpoint: String,
    /// Value of the `service.name` resource attribute.
    pub service_name: String,
    /// Value of the `service.version` resource attribute.
    pub service_version: String,
}

/// OTLP/HTTP implementation of [`LogSink`].
#[derive(Clone)]
pub struct OtlpSink {
    client: Client,
    config: OtlpConfig,
}

impl OtlpSink {
    /// Construct a new sink instance using the provided configuration.
    ///
    /// **Returns**
    /// - A ready-to-use [`OtlpSink`], or a [`SinkError`] if the HTTP client
    ///   could not be built (propagated out of `initialize()` as a
    ///   sink-construction failure).
    pub fn new(config: OtlpConfig) -> Result<Self, SinkError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/logs", self.config.endpoint.trim_end_matches('/'))
    }

    fn map_event(&self, event: &LogEvent) -> ExportLogsRequest {
        let attributes = event
            .metadata
            .iter()
            .map(|(key, value)| KeyValue {
                key: key.clone(),
                value: AnyValue::from_json(value),
            })
            .collect();

        ExportLogsRequest {
            resource_logs: vec![ResourceLogs {
                resource: Resource {
                    attributes: vec![
                        KeyValue {
                            key: "service.name".to_string(),
                            value: AnyValue::StringValue(self.config.service_name.clone()),
                        },
                        KeyValue {
                            key: "service.version".to_string(),
                            value: AnyValue::StringValue(self.config.service_version.clone()),
                        },
                    ],
                },
                scope_logs: vec![ScopeLogs {
                    log_records: vec![OtlpLogRecord {
                        time_unix_nano: event
                            .timestamp
                            .timestamp_nanos_opt()
                            .unwrap_or(0)
                            .to_string(),
                        severity_number: event.level.severity_number(),
                        severity_text: event.level.severity_text(),
                        body: AnyValue::StringValue(event.message.clone()),
                        attributes,
                    }],
                }],
            }],
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportLogsRequest {
    resource_logs: Vec<ResourceLogs>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceLogs {
    resource: Resource,
    scope_logs: Vec<ScopeLogs>,
}

#[derive(Serialize)]
struct Resource {
    attributes: Vec<KeyValue>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScopeLogs {
    log_records: Vec<OtlpLogRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OtlpLogRecord {
    time_unix_nano: String,
    severity_number: u32,
    severity_text: &'static str,
    body: AnyValue,
    attributes: Vec<KeyValue>,
}

#[derive(Serialize)]
struct KeyValue {
    key: String,
    value: AnyValue,
}

/// Protojson `AnyValue`. Integers ride as strings per the proto3 JSON
/// mapping of int64.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum AnyValue {
    StringValue(String),
    BoolValue(bool),
    IntValue(String),
    DoubleValue(f64),
    ArrayValue(ArrayValue),
    KvlistValue(KvList),
}

#[derive(Serialize)]
struct ArrayValue {
    values: Vec<AnyValue>,
}

#[derive(Serialize)]
struct KvList {
    values: Vec<KeyValue>,
}

impl AnyValue {
    fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => AnyValue::StringValue("null".to_string()),
            Value::Bool(b) => AnyValue::BoolValue(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    AnyValue::IntValue(i.to_string())
                } else if let Some(u) = n.as_u64() {
                    AnyValue::IntValue(u.to_string())
                } else {
                    AnyValue::DoubleValue(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => AnyValue::StringValue(s.clone()),
            Value::Array(items) => AnyValue::ArrayValue(ArrayValue {
                values: items.iter().map(AnyValue::from_json).collect(),
            }),
            Value::Object(map) => AnyValue::KvlistValue(KvList {
                values: map
                    .iter()
                    .map(|(k, v)| KeyValue {
                        key: k.clone(),
                        value: AnyValue::from_json(v),
                    })
                    .collect(),
            }),
        }
    }
}

#[async_trait]
impl LogSink for OtlpSink {
    async fn send(&self, event: &LogEvent) -> Result<(), SinkError> {
        let request = self.map_event(event);
        let resp = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            Err(SinkError::Http { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LogLevel;
    use crate::record::Metadata;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn sink() -> OtlpSink {
        OtlpSink::new(OtlpConfig {
            endpoint: "http://127.0.0.1:4318/".to_string(),
            service_name: "svc".to_string(),
            service_version: "1.2.3".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn endpoint_appends_signal_path_once() {
        assert_eq!(sink().endpoint(), "http://127.0.0.1:4318/v1/logs");
    }

    #[test]
    fn wire_record_matches_collector_contract() {
        let mut metadata = Metadata::new();
        metadata.insert("attempt".into(), json!(2));
        metadata.insert("queue".into(), json!("tasks"));

        let event = LogEvent {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            level: LogLevel::Warn,
            service: "svc".into(),
            message: "low disk".into(),
            metadata,
            correlation_id: None,
        };

        let body = serde_json::to_value(sink().map_event(&event)).unwrap();
        let record = &body["resourceLogs"][0]["scopeLogs"][0]["logRecords"][0];

        assert_eq!(record["severityNumber"], json!(13));
        assert_eq!(record["severityText"], json!("WARN"));
        assert_eq!(record["body"], json!({"stringValue": "low disk"}));
        assert_eq!(record["timeUnixNano"], json!("1714521600000000000"));
        assert_eq!(
            record["attributes"],
            json!([
                {"key": "attempt", "value": {"intValue": "2"}},
                {"key": "queue", "value": {"stringValue": "tasks"}}
            ])
        );

        let resource = &body["resourceLogs"][0]["resource"]["attributes"];
        assert_eq!(
            resource,
            &json!([
                {"key": "service.name", "value": {"stringValue": "svc"}},
                {"key": "service.version", "value": {"stringValue": "1.2.3"}}
            ])
        );
    }
}
