use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use super::{host, pick, pick_weighted, pod, span_id, trace_id};
use crate::domain::catalog::{ERROR_MESSAGES, INFO_MESSAGES, SERVICES};
use crate::domain::{LogLevel, LogRecord};

/// Share of logs that belong to a trace.
const TRACE_CORRELATION_PROBABILITY: f64 = 0.7;

/// Builds one log line at `timestamp` for a random service.
pub fn synthesize_log<R: Rng + ?Sized>(
    rng: &mut R,
    team_id: Uuid,
    timestamp: DateTime<Utc>,
) -> LogRecord {
    let service = pick(SERVICES, rng).0;
    let level = *pick_weighted(&LogLevel::WEIGHTS, rng);

    let (message, exception) = if level == LogLevel::Error {
        let message = *pick(ERROR_MESSAGES, rng);
        (message, stack_trace(message))
    } else {
        (*pick(INFO_MESSAGES, rng), String::new())
    };

    let (trace_id, span_id) = if rng.random_bool(TRACE_CORRELATION_PROBABILITY) {
        (trace_id(rng), span_id(rng))
    } else {
        (String::new(), String::new())
    };

    LogRecord {
        team_id,
        timestamp,
        level,
        service_name: service.to_string(),
        logger: logger_name(service),
        message: message.to_string(),
        trace_id,
        span_id,
        host: host(rng),
        pod: pod(service, rng),
        container: service.to_string(),
        thread: format!("thread-{}", rng.random_range(1..=20)),
        exception,
        attributes: Vec::new(),
    }
}

fn logger_name(service: &str) -> String {
    format!("com.example.{}.Handler", service.replace('-', "."))
}

fn stack_trace(message: &str) -> String {
    format!(
        "java.lang.RuntimeException: {message}\n\tat com.example.Service.method(Service.java:42)"
    )
}
