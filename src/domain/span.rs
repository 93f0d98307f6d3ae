use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Every synthesized span is the server side of its hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Server,
}

impl SpanKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SpanKind::Server => "SERVER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStatus {
    Ok,
    Error,
}

impl SpanStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SpanStatus::Ok => "OK",
            SpanStatus::Error => "ERROR",
        }
    }

    /// Server-side failures mark the span as errored.
    #[must_use]
    pub const fn from_http_status(code: u16) -> Self {
        if code >= 500 {
            SpanStatus::Error
        } else {
            SpanStatus::Ok
        }
    }
}

/// One timed operation of a trace.
///
/// String fields that do not apply are empty rather than absent, matching the
/// non-nullable analytics columns. `parent_span_id` is `None` only on roots.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanRecord {
    pub team_id: Uuid,
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: Option<String>,
    pub is_root: bool,
    pub operation_name: String,
    pub service_name: String,
    pub span_kind: SpanKind,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: u64,
    pub status: SpanStatus,
    pub status_message: String,
    pub http_method: String,
    pub http_url: String,
    /// 0 when the span did not serve an HTTP request.
    pub http_status_code: u16,
    pub host: String,
    pub pod: String,
    pub container: String,
    pub attributes: Vec<(String, String)>,
}
