use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use uuid::Uuid;

use super::{host, pick, pick_weighted, pod, span_id, trace_id};
use crate::domain::catalog::{
    API_BASE_URL, GATEWAY_SERVICE, HTTP_METHODS, HTTP_STATUS_WEIGHTS, downstream_services,
    endpoints_of,
};
use crate::domain::{SpanKind, SpanRecord, SpanStatus};

const ROOT_DURATION_MS: std::ops::RangeInclusive<u64> = 50..=500;
const FIRST_CHILD_OFFSET_MS: i64 = 5;
const CHILD_BUDGET_RESERVE_MS: u64 = 10;
const CHILD_MIN_DURATION_MS: u64 = 10;
const CHILD_DURATION_FLOOR_MS: u64 = 20;
const CHILD_ERROR_PROBABILITY: f64 = 0.05;

/// Builds one trace: a gateway root span followed by 2-4 downstream children.
///
/// The root is always first in the returned vector.
pub fn synthesize_trace<R: Rng + ?Sized>(
    rng: &mut R,
    team_id: Uuid,
    start_time: DateTime<Utc>,
) -> Vec<SpanRecord> {
    let trace_id = trace_id(rng);
    let root_span_id = span_id(rng);
    let root_duration = rng.random_range(ROOT_DURATION_MS);
    let http_method = *pick(HTTP_METHODS, rng);
    let http_status = *pick_weighted(HTTP_STATUS_WEIGHTS, rng);
    let gateway_endpoints = endpoints_of(GATEWAY_SERVICE);

    let root = SpanRecord {
        team_id,
        trace_id: trace_id.clone(),
        span_id: root_span_id.clone(),
        parent_span_id: None,
        is_root: true,
        operation_name: (*pick(gateway_endpoints, rng)).to_string(),
        service_name: GATEWAY_SERVICE.to_string(),
        span_kind: SpanKind::Server,
        start_time,
        end_time: start_time + Duration::milliseconds(root_duration as i64),
        duration_ms: root_duration,
        status: SpanStatus::from_http_status(http_status),
        status_message: String::new(),
        http_method: http_method.to_string(),
        http_url: format!("{API_BASE_URL}{}", pick(gateway_endpoints, rng)),
        http_status_code: http_status,
        host: host(rng),
        pod: pod(GATEWAY_SERVICE, rng),
        container: GATEWAY_SERVICE.to_string(),
        attributes: Vec::new(),
    };

    let downstream = downstream_services();
    let fan_out = rng.random_range(2..=4);
    let services: Vec<&str> = downstream.choose_multiple(rng, fan_out).copied().collect();

    let mut spans = Vec::with_capacity(services.len() + 1);
    spans.push(root);

    let mut cursor = start_time + Duration::milliseconds(FIRST_CHILD_OFFSET_MS);
    let mut remaining = root_duration.saturating_sub(CHILD_BUDGET_RESERVE_MS);

    for service in services {
        let upper = CHILD_DURATION_FLOOR_MS.max(remaining / 2);
        let duration = rng.random_range(CHILD_MIN_DURATION_MS..=upper);
        let status = if rng.random_bool(CHILD_ERROR_PROBABILITY) {
            SpanStatus::Error
        } else {
            SpanStatus::Ok
        };

        spans.push(SpanRecord {
            team_id,
            trace_id: trace_id.clone(),
            span_id: span_id(rng),
            parent_span_id: Some(root_span_id.clone()),
            is_root: false,
            operation_name: (*pick(endpoints_of(service), rng)).to_string(),
            service_name: service.to_string(),
            span_kind: SpanKind::Server,
            start_time: cursor,
            end_time: cursor + Duration::milliseconds(duration as i64),
            duration_ms: duration,
            status,
            status_message: String::new(),
            http_method: String::new(),
            http_url: String::new(),
            http_status_code: 0,
            host: host(rng),
            pod: pod(service, rng),
            container: service.to_string(),
            attributes: Vec::new(),
        });

        let gap = rng.random_range(1..=5);
        cursor += Duration::milliseconds((duration + gap) as i64);
        remaining = remaining.saturating_sub(duration + gap);
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn start() -> DateTime<Utc> {
        "2024-06-15T10:30:00Z".parse().unwrap()
    }

    #[test]
    fn root_comes_first_and_children_point_at_it() {
        let mut rng = StdRng::seed_from_u64(42);
        let spans = synthesize_trace(&mut rng, Uuid::nil(), start());

        let root = &spans[0];
        assert!(root.is_root);
        assert_eq!(root.parent_span_id, None);
        assert_eq!(root.service_name, GATEWAY_SERVICE);
        assert!((2..=4).contains(&(spans.len() - 1)));

        for child in &spans[1..] {
            assert!(!child.is_root);
            assert_eq!(child.parent_span_id.as_deref(), Some(root.span_id.as_str()));
            assert_eq!(child.trace_id, root.trace_id);
            assert_ne!(child.service_name, GATEWAY_SERVICE);
        }
    }

    #[test]
    fn children_use_distinct_services() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let spans = synthesize_trace(&mut rng, Uuid::nil(), start());
            let services: HashSet<_> = spans[1..].iter().map(|s| &s.service_name).collect();
            assert_eq!(services.len(), spans.len() - 1);
        }
    }

    #[test]
    fn root_status_is_error_iff_server_failure() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut saw_error = false;
        for _ in 0..500 {
            let spans = synthesize_trace(&mut rng, Uuid::nil(), start());
            let root = &spans[0];
            assert_eq!(
                root.status == SpanStatus::Error,
                root.http_status_code >= 500,
                "status {:?} for http {}",
                root.status,
                root.http_status_code
            );
            saw_error |= root.status == SpanStatus::Error;
        }
        assert!(saw_error);
    }

    #[test]
    fn timing_is_consistent() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let spans = synthesize_trace(&mut rng, Uuid::nil(), start());
            let root = &spans[0];
            assert!(ROOT_DURATION_MS.contains(&root.duration_ms));

            let mut previous_end = root.start_time;
            for span in &spans {
                assert!(span.start_time >= root.start_time);
                assert_eq!(
                    span.end_time - span.start_time,
                    Duration::milliseconds(span.duration_ms as i64)
                );
            }
            for child in &spans[1..] {
                assert!(child.duration_ms >= CHILD_MIN_DURATION_MS);
                assert!(child.start_time >= previous_end);
                previous_end = child.end_time;
            }
        }
    }

    #[test]
    fn only_root_carries_http_fields() {
        let mut rng = StdRng::seed_from_u64(5);
        let spans = synthesize_trace(&mut rng, Uuid::nil(), start());
        assert!(spans[0].http_url.starts_with(API_BASE_URL));
        assert!(HTTP_METHODS.contains(&spans[0].http_method.as_str()));
        for child in &spans[1..] {
            assert!(child.http_method.is_empty());
            assert_eq!(child.http_status_code, 0);
        }
    }
}
