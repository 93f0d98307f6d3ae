//! JSON bodies accepted by the backend's ingestion API.
//!
//! Payloads are built from the same records as the ClickHouse rows. Field names
//! follow the backend's request DTOs, so a few differ from the column names:
//! spans send `duration`, `kind` and `node` for `duration_ms`, `span_kind` and
//! `host`. Empty optional strings become `null`.

use crate::domain::{LogRecord, SpanRecord};
use chrono::SecondsFormat;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogPayload<'a> {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub level: &'a str,
    pub service_name: &'a str,
    pub logger: Option<&'a str>,
    pub message: &'a str,
    pub trace_id: Option<&'a str>,
    pub span_id: Option<&'a str>,
    pub host: Option<&'a str>,
    pub pod: Option<&'a str>,
    pub container: Option<&'a str>,
    pub thread: Option<&'a str>,
    pub exception: Option<&'a str>,
    pub attributes: BTreeMap<&'a str, &'a str>,
}

impl<'a> From<&'a LogRecord> for LogPayload<'a> {
    fn from(log: &'a LogRecord) -> Self {
        Self {
            timestamp: log.timestamp.timestamp_millis(),
            level: log.level.as_str(),
            service_name: &log.service_name,
            logger: non_empty(&log.logger),
            message: &log.message,
            trace_id: non_empty(&log.trace_id),
            span_id: non_empty(&log.span_id),
            host: non_empty(&log.host),
            pod: non_empty(&log.pod),
            container: non_empty(&log.container),
            thread: non_empty(&log.thread),
            exception: non_empty(&log.exception),
            attributes: attributes(&log.attributes),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpanPayload<'a> {
    pub trace_id: &'a str,
    pub span_id: &'a str,
    pub parent_span_id: Option<&'a str>,
    pub is_root: bool,
    pub operation_name: &'a str,
    pub service_name: &'a str,
    #[serde(rename = "kind")]
    pub span_kind: &'a str,
    /// ISO-8601, millisecond precision, `Z` suffix.
    pub start_time: String,
    pub end_time: String,
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    pub status: &'a str,
    pub status_message: Option<&'a str>,
    pub http_method: Option<&'a str>,
    pub http_url: Option<&'a str>,
    pub http_status_code: Option<u16>,
    #[serde(rename = "node")]
    pub host: Option<&'a str>,
    pub pod: Option<&'a str>,
    pub container: Option<&'a str>,
    pub attributes: BTreeMap<&'a str, &'a str>,
}

impl<'a> From<&'a SpanRecord> for SpanPayload<'a> {
    fn from(span: &'a SpanRecord) -> Self {
        Self {
            trace_id: &span.trace_id,
            span_id: &span.span_id,
            parent_span_id: span.parent_span_id.as_deref().and_then(non_empty),
            is_root: span.is_root,
            operation_name: &span.operation_name,
            service_name: &span.service_name,
            span_kind: span.span_kind.as_str(),
            start_time: span.start_time.to_rfc3339_opts(SecondsFormat::Millis, true),
            end_time: span.end_time.to_rfc3339_opts(SecondsFormat::Millis, true),
            duration_ms: span.duration_ms,
            status: span.status.as_str(),
            status_message: non_empty(&span.status_message),
            http_method: non_empty(&span.http_method),
            http_url: non_empty(&span.http_url),
            http_status_code: (span.http_status_code != 0).then_some(span.http_status_code),
            host: non_empty(&span.host),
            pod: non_empty(&span.pod),
            container: non_empty(&span.container),
            attributes: attributes(&span.attributes),
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

fn attributes(pairs: &[(String, String)]) -> BTreeMap<&str, &str> {
    pairs
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_logs, sample_span};
    use serde_json::{Value, json};

    #[test]
    fn log_payload_uses_epoch_millis_and_camel_case() {
        let log = sample_logs(1).remove(0);
        let value = serde_json::to_value(LogPayload::from(&log)).unwrap();

        assert_eq!(value["timestamp"], json!(log.timestamp.timestamp_millis()));
        assert_eq!(value["serviceName"], json!("order-service"));
        assert_eq!(value["level"], json!("INFO"));
        assert!(value.get("service_name").is_none());
    }

    #[test]
    fn log_payload_turns_empty_strings_into_null() {
        let log = sample_logs(1).remove(0);
        let value = serde_json::to_value(LogPayload::from(&log)).unwrap();

        assert_eq!(value["traceId"], Value::Null);
        assert_eq!(value["spanId"], Value::Null);
        assert_eq!(value["exception"], Value::Null);
        assert_eq!(value["host"], json!("host-1"));
    }

    #[test]
    fn span_payload_uses_iso_timestamps_with_utc_suffix() {
        let span = sample_span();
        let payload = SpanPayload::from(&span);

        assert_eq!(payload.start_time, "2024-06-15T10:30:00.000Z");
        assert_eq!(payload.end_time, "2024-06-15T10:30:00.120Z");
        assert_eq!(payload.http_status_code, Some(503));
        assert_eq!(payload.parent_span_id, None);
        assert_eq!(payload.status_message, None);
    }

    #[test]
    fn span_payload_drops_zero_status_code() {
        let mut span = sample_span();
        span.http_status_code = 0;
        span.http_method = String::new();
        let value = serde_json::to_value(SpanPayload::from(&span)).unwrap();

        assert_eq!(value["httpStatusCode"], Value::Null);
        assert_eq!(value["httpMethod"], Value::Null);
        assert_eq!(value["isRoot"], json!(true));
    }

    #[test]
    fn span_payload_keys_match_backend_request() {
        let span = sample_span();
        let value = serde_json::to_value(SpanPayload::from(&span)).unwrap();
        let mut keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();

        let mut expected = vec![
            "traceId",
            "spanId",
            "parentSpanId",
            "isRoot",
            "operationName",
            "serviceName",
            "kind",
            "startTime",
            "endTime",
            "duration",
            "status",
            "statusMessage",
            "httpMethod",
            "httpUrl",
            "httpStatusCode",
            "node",
            "pod",
            "container",
            "attributes",
        ];
        expected.sort_unstable();
        assert_eq!(keys, expected);

        assert_eq!(value["duration"], json!(120));
        assert_eq!(value["kind"], json!("SERVER"));
        assert_eq!(value["node"], json!(span.host));
    }
}
