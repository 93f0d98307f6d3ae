pub mod catalog;
pub mod incident;
pub mod log_entry;
pub mod span;

use std::fmt;

pub use incident::{IncidentRecord, IncidentStatus, Severity};
pub use log_entry::{LogLevel, LogRecord};
pub use span::{SpanKind, SpanRecord, SpanStatus};

/// Rows per batch flushed to the analytics store unless configured otherwise.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 5000;

/// The three record kinds written to the analytics store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Span,
    Log,
    Incident,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [RecordKind::Span, RecordKind::Log, RecordKind::Incident];

    /// Analytics table the kind is bulk-inserted into.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            RecordKind::Span => "spans",
            RecordKind::Log => "logs",
            RecordKind::Incident => "incidents",
        }
    }

    /// Column order used for direct inserts. Row types serialize in this order.
    #[must_use]
    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            RecordKind::Span => &[
                "team_id",
                "trace_id",
                "span_id",
                "parent_span_id",
                "is_root",
                "operation_name",
                "service_name",
                "span_kind",
                "start_time",
                "end_time",
                "duration_ms",
                "status",
                "status_message",
                "http_method",
                "http_url",
                "http_status_code",
                "host",
                "pod",
                "container",
                "attributes",
            ],
            RecordKind::Log => &[
                "team_id",
                "timestamp",
                "level",
                "service_name",
                "logger",
                "message",
                "trace_id",
                "span_id",
                "host",
                "pod",
                "container",
                "thread",
                "exception",
                "attributes",
            ],
            RecordKind::Incident => &[
                "team_id",
                "incident_id",
                "alert_policy_id",
                "title",
                "description",
                "severity",
                "priority",
                "status",
                "source",
                "service_name",
                "created_at",
                "updated_at",
                "resolved_at",
                "acknowledged_at",
                "acknowledged_by",
                "attributes",
            ],
        }
    }

    /// REST ingestion path, if the backend exposes one for this kind.
    #[must_use]
    pub const fn ingest_path(self) -> Option<&'static str> {
        match self {
            RecordKind::Span => Some("/api/ingest/spans"),
            RecordKind::Log => Some("/api/ingest/logs"),
            RecordKind::Incident => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// A synthesized row that belongs to exactly one [`RecordKind`].
pub trait Record: Clone + Send + Sync + 'static {
    const KIND: RecordKind;

    fn into_record_batch(rows: Vec<Self>) -> RecordBatch;
}

impl Record for SpanRecord {
    const KIND: RecordKind = RecordKind::Span;

    fn into_record_batch(rows: Vec<Self>) -> RecordBatch {
        RecordBatch::Spans(rows)
    }
}

impl Record for LogRecord {
    const KIND: RecordKind = RecordKind::Log;

    fn into_record_batch(rows: Vec<Self>) -> RecordBatch {
        RecordBatch::Logs(rows)
    }
}

impl Record for IncidentRecord {
    const KIND: RecordKind = RecordKind::Incident;

    fn into_record_batch(rows: Vec<Self>) -> RecordBatch {
        RecordBatch::Incidents(rows)
    }
}

/// Rows of a single kind, handed to the writer as one unit.
#[derive(Debug, Clone)]
pub enum RecordBatch {
    Spans(Vec<SpanRecord>),
    Logs(Vec<LogRecord>),
    Incidents(Vec<IncidentRecord>),
}

impl RecordBatch {
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordBatch::Spans(_) => RecordKind::Span,
            RecordBatch::Logs(_) => RecordKind::Log,
            RecordBatch::Incidents(_) => RecordKind::Incident,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            RecordBatch::Spans(rows) => rows.len(),
            RecordBatch::Logs(rows) => rows.len(),
            RecordBatch::Incidents(rows) => rows.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Splits the batch into consecutive sub-batches of at most `size` rows,
    /// preserving row order.
    #[must_use]
    pub fn into_chunks(self, size: usize) -> Vec<RecordBatch> {
        match self {
            RecordBatch::Spans(rows) => chunk_rows(rows, size)
                .into_iter()
                .map(RecordBatch::Spans)
                .collect(),
            RecordBatch::Logs(rows) => chunk_rows(rows, size)
                .into_iter()
                .map(RecordBatch::Logs)
                .collect(),
            RecordBatch::Incidents(rows) => chunk_rows(rows, size)
                .into_iter()
                .map(RecordBatch::Incidents)
                .collect(),
        }
    }
}

fn chunk_rows<T>(rows: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut chunks = Vec::with_capacity(rows.len().div_ceil(size));
    let mut current = Vec::with_capacity(size.min(rows.len()));
    for row in rows {
        current.push(row);
        if current.len() == size {
            chunks.push(std::mem::replace(&mut current, Vec::with_capacity(size)));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
