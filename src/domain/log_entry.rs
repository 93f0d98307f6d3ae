use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Levels with their relative frequency in generated logs.
    pub const WEIGHTS: [(LogLevel, u32); 5] = [
        (LogLevel::Trace, 5),
        (LogLevel::Debug, 15),
        (LogLevel::Info, 60),
        (LogLevel::Warn, 15),
        (LogLevel::Error, 5),
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// A single application log line. Empty strings mean "not set".
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub team_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub service_name: String,
    pub logger: String,
    pub message: String,
    pub trace_id: String,
    pub span_id: String,
    pub host: String,
    pub pod: String,
    pub container: String,
    pub thread: String,
    pub exception: String,
    pub attributes: Vec<(String, String)>,
}
