//! Shared test support utilities
//!
//! Sample records plus in-memory `DirectSink` / `IngestApi` doubles for the
//! writer and adapter tests.

use crate::adapter::rest::IngestError;
use crate::domain::catalog::DEMO_USER_EMAIL;
use crate::domain::{
    IncidentRecord, IncidentStatus, LogLevel, LogRecord, RecordBatch, RecordKind, Severity,
    SpanKind, SpanRecord, SpanStatus,
};
use crate::error::SeederError;
use crate::port::{DirectSink, IngestApi};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

pub fn sample_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap()
}

pub fn sample_team() -> Uuid {
    Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap()
}

/// `n` INFO logs with distinct messages `log 0`, `log 1`, ...
pub fn sample_logs(n: usize) -> Vec<LogRecord> {
    (0..n)
        .map(|i| LogRecord {
            team_id: sample_team(),
            timestamp: sample_time() + Duration::milliseconds(i as i64),
            level: LogLevel::Info,
            service_name: "order-service".to_string(),
            logger: "com.example.order.service.Handler".to_string(),
            message: format!("log {i}"),
            trace_id: String::new(),
            span_id: String::new(),
            host: "host-1".to_string(),
            pod: "pod-order-service-1".to_string(),
            container: "order-service".to_string(),
            thread: "thread-1".to_string(),
            exception: String::new(),
            attributes: Vec::new(),
        })
        .collect()
}

/// A failed root span: 503 from the gateway, 120 ms long.
pub fn sample_span() -> SpanRecord {
    let start = sample_time();
    SpanRecord {
        team_id: sample_team(),
        trace_id: "0af7651916cd43dd8448eb211c80319c".to_string(),
        span_id: "b7ad6b7169203331".to_string(),
        parent_span_id: None,
        is_root: true,
        operation_name: "GET /api/orders".to_string(),
        service_name: "api-gateway".to_string(),
        span_kind: SpanKind::Server,
        start_time: start,
        end_time: start + Duration::milliseconds(120),
        duration_ms: 120,
        status: SpanStatus::Error,
        status_message: String::new(),
        http_method: "GET".to_string(),
        http_url: "https://api.example.com/api/orders".to_string(),
        http_status_code: 503,
        host: "host-2".to_string(),
        pod: "pod-api-gateway-1".to_string(),
        container: "api-gateway".to_string(),
        attributes: Vec::new(),
    }
}

pub fn sample_spans(n: usize) -> Vec<SpanRecord> {
    (0..n)
        .map(|i| {
            let mut span = sample_span();
            span.span_id = format!("{i:016x}");
            span
        })
        .collect()
}

/// A resolved CRITICAL incident acknowledged by the demo user.
pub fn sample_incident() -> IncidentRecord {
    let created = sample_time();
    let acknowledged = created + Duration::minutes(10);
    IncidentRecord {
        team_id: sample_team(),
        incident_id: Uuid::parse_str("0f8e3f7a-2b1c-4d5e-9f60-718293a4b5c6").unwrap(),
        alert_policy_id: Uuid::parse_str("5a6b7c8d-9e0f-4a1b-8c2d-3e4f5a6b7c8d").unwrap(),
        title: "CRITICAL alert: payment-service - High error rate".to_string(),
        description: "Automated alert triggered for payment-service".to_string(),
        severity: Severity::Critical,
        status: IncidentStatus::Resolved,
        source: "prometheus".to_string(),
        service_name: "payment-service".to_string(),
        created_at: created,
        updated_at: created,
        resolved_at: Some(acknowledged + Duration::minutes(45)),
        acknowledged_at: Some(acknowledged),
        acknowledged_by: Some(DEMO_USER_EMAIL.to_string()),
        attributes: Vec::new(),
    }
}

/// Direct sink that records the size and kind of every insert.
#[derive(Default)]
pub struct RecordingSink {
    inserts: Mutex<Vec<(RecordKind, usize)>>,
    should_fail: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn inserts(&self) -> Vec<(RecordKind, usize)> {
        self.inserts.lock().unwrap().clone()
    }

    pub fn rows_inserted(&self) -> usize {
        self.inserts().iter().map(|(_, n)| n).sum()
    }
}

impl DirectSink for RecordingSink {
    fn insert<'a>(
        &'a self,
        batch: &'a RecordBatch,
    ) -> Pin<Box<dyn Future<Output = Result<(), SeederError>> + Send + 'a>> {
        Box::pin(async move {
            if self.should_fail.load(Ordering::SeqCst) {
                return Err(SeederError::Insert {
                    table: batch.kind().table(),
                    rows: batch.len(),
                    source: clickhouse::error::Error::Custom("mock insert failure".to_string()),
                });
            }
            self.inserts
                .lock()
                .unwrap()
                .push((batch.kind(), batch.len()));
            Ok(())
        })
    }
}

/// REST double that fails the calls whose zero-based index is listed.
#[derive(Default)]
pub struct ScriptedIngestApi {
    failing_calls: HashSet<usize>,
    calls: AtomicUsize,
    accepted: Mutex<Vec<(RecordKind, usize)>>,
}

impl ScriptedIngestApi {
    pub fn failing_on(calls: impl IntoIterator<Item = usize>) -> Self {
        Self {
            failing_calls: calls.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn accepted(&self) -> Vec<(RecordKind, usize)> {
        self.accepted.lock().unwrap().clone()
    }
}

impl IngestApi for ScriptedIngestApi {
    fn post<'a>(
        &'a self,
        batch: &'a RecordBatch,
    ) -> Pin<Box<dyn Future<Output = Result<(), IngestError>> + Send + 'a>> {
        Box::pin(async move {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing_calls.contains(&call) {
                return Err(IngestError::HttpError {
                    status: 500,
                    message: "scripted failure".to_string(),
                });
            }
            self.accepted
                .lock()
                .unwrap()
                .push((batch.kind(), batch.len()));
            Ok(())
        })
    }
}
