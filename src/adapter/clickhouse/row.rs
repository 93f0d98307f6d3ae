//! RowBinary row types. Field order is the insert column order and must match
//! [`RecordKind::columns`](crate::domain::RecordKind::columns).

use crate::domain::{IncidentRecord, LogRecord, SpanRecord};
use chrono::{DateTime, Utc};
use clickhouse::serde::chrono::datetime64::millis;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(clickhouse::Row, Serialize, Deserialize, Clone, Debug)]
pub struct SpanRow {
    #[serde(with = "clickhouse::serde::uuid")]
    pub team_id: Uuid, // UUID
    pub trace_id: String,               // String
    pub span_id: String,                // String
    pub parent_span_id: Option<String>, // Nullable(String)
    pub is_root: u8,                    // UInt8
    pub operation_name: String,         // String
    pub service_name: String,           // LowCardinality(String)
    pub span_kind: String,              // LowCardinality(String)
    #[serde(with = "millis")]
    pub start_time: DateTime<Utc>, // DateTime64(3,'UTC')
    #[serde(with = "millis")]
    pub end_time: DateTime<Utc>, // DateTime64(3,'UTC')
    pub duration_ms: u64,       // UInt64
    pub status: String,         // LowCardinality(String)
    pub status_message: String, // String
    pub http_method: String,    // LowCardinality(String)
    pub http_url: String,       // String
    pub http_status_code: u16,  // UInt16
    pub host: String,           // LowCardinality(String)
    pub pod: String,            // LowCardinality(String)
    pub container: String,      // LowCardinality(String)
    pub attributes: Vec<(String, String)>, // Map(String,String)
}

impl From<&SpanRecord> for SpanRow {
    fn from(span: &SpanRecord) -> Self {
        Self {
            team_id: span.team_id,
            trace_id: span.trace_id.clone(),
            span_id: span.span_id.clone(),
            parent_span_id: span.parent_span_id.clone(),
            is_root: u8::from(span.is_root),
            operation_name: span.operation_name.clone(),
            service_name: span.service_name.clone(),
            span_kind: span.span_kind.as_str().to_string(),
            start_time: span.start_time,
            end_time: span.end_time,
            duration_ms: span.duration_ms,
            status: span.status.as_str().to_string(),
            status_message: span.status_message.clone(),
            http_method: span.http_method.clone(),
            http_url: span.http_url.clone(),
            http_status_code: span.http_status_code,
            host: span.host.clone(),
            pod: span.pod.clone(),
            container: span.container.clone(),
            attributes: span.attributes.clone(),
        }
    }
}

#[derive(clickhouse::Row, Serialize, Deserialize, Clone, Debug)]
pub struct LogRow {
    #[serde(with = "clickhouse::serde::uuid")]
    pub team_id: Uuid, // UUID
    #[serde(with = "millis")]
    pub timestamp: DateTime<Utc>, // DateTime64(3,'UTC')
    pub level: String,        // LowCardinality(String)
    pub service_name: String, // LowCardinality(String)
    pub logger: String,       // String
    pub message: String,      // String
    pub trace_id: String,     // String
    pub span_id: String,      // String
    pub host: String,         // LowCardinality(String)
    pub pod: String,          // LowCardinality(String)
    pub container: String,    // LowCardinality(String)
    pub thread: String,       // String
    pub exception: String,    // String
    pub attributes: Vec<(String, String)>, // Map(String,String)
}

impl From<&LogRecord> for LogRow {
    fn from(log: &LogRecord) -> Self {
        Self {
            team_id: log.team_id,
            timestamp: log.timestamp,
            level: log.level.as_str().to_string(),
            service_name: log.service_name.clone(),
            logger: log.logger.clone(),
            message: log.message.clone(),
            trace_id: log.trace_id.clone(),
            span_id: log.span_id.clone(),
            host: log.host.clone(),
            pod: log.pod.clone(),
            container: log.container.clone(),
            thread: log.thread.clone(),
            exception: log.exception.clone(),
            attributes: log.attributes.clone(),
        }
    }
}

#[derive(clickhouse::Row, Serialize, Deserialize, Clone, Debug)]
pub struct IncidentRow {
    #[serde(with = "clickhouse::serde::uuid")]
    pub team_id: Uuid, // UUID
    #[serde(with = "clickhouse::serde::uuid")]
    pub incident_id: Uuid, // UUID
    #[serde(with = "clickhouse::serde::uuid")]
    pub alert_policy_id: Uuid, // UUID
    pub title: String,        // String
    pub description: String,  // String
    pub severity: String,     // LowCardinality(String)
    pub priority: String,     // LowCardinality(String)
    pub status: String,       // LowCardinality(String)
    pub source: String,       // LowCardinality(String)
    pub service_name: String, // LowCardinality(String)
    #[serde(with = "millis")]
    pub created_at: DateTime<Utc>, // DateTime64(3,'UTC')
    #[serde(with = "millis")]
    pub updated_at: DateTime<Utc>, // DateTime64(3,'UTC')
    #[serde(with = "millis::option")]
    pub resolved_at: Option<DateTime<Utc>>, // Nullable(DateTime64(3,'UTC'))
    #[serde(with = "millis::option")]
    pub acknowledged_at: Option<DateTime<Utc>>, // Nullable(DateTime64(3,'UTC'))
    pub acknowledged_by: Option<String>, // Nullable(String)
    pub attributes: Vec<(String, String)>, // Map(String,String)
}

impl From<&IncidentRecord> for IncidentRow {
    fn from(incident: &IncidentRecord) -> Self {
        Self {
            team_id: incident.team_id,
            incident_id: incident.incident_id,
            alert_policy_id: incident.alert_policy_id,
            title: incident.title.clone(),
            description: incident.description.clone(),
            severity: incident.severity.as_str().to_string(),
            priority: incident.severity.priority().to_string(),
            status: incident.status.as_str().to_string(),
            source: incident.source.clone(),
            service_name: incident.service_name.clone(),
            created_at: incident.created_at,
            updated_at: incident.updated_at,
            resolved_at: incident.resolved_at,
            acknowledged_at: incident.acknowledged_at,
            acknowledged_by: incident.acknowledged_by.clone(),
            attributes: incident.attributes.clone(),
        }
    }
}
