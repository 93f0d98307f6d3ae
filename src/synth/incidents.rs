use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use uuid::Uuid;

use super::{pick, random_uuid};
use crate::domain::catalog::{DEMO_USER_EMAIL, SERVICES};
use crate::domain::{IncidentRecord, IncidentStatus, Severity};

const INCIDENT_SOURCE: &str = "prometheus";

/// Builds one incident created `days_ago` days before `now`.
///
/// Acknowledgement and resolution timestamps are only set when the drawn
/// status implies them, and always follow the creation time.
pub fn synthesize_incident<R: Rng + ?Sized>(
    rng: &mut R,
    team_id: Uuid,
    days_ago: u32,
    now: DateTime<Utc>,
) -> IncidentRecord {
    let created_at =
        now - Duration::days(i64::from(days_ago)) - Duration::hours(rng.random_range(0..=23));
    let status = *pick(&IncidentStatus::ALL, rng);
    let severity = *pick(&Severity::ALL, rng);
    let service = pick(SERVICES, rng).0;

    let (acknowledged_at, acknowledged_by) = if status.is_acknowledged() {
        (
            Some(created_at + Duration::minutes(rng.random_range(5..=60))),
            Some(DEMO_USER_EMAIL.to_string()),
        )
    } else {
        (None, None)
    };

    let resolved_at = match (status, acknowledged_at) {
        (IncidentStatus::Resolved, Some(acked)) => {
            Some(acked + Duration::minutes(rng.random_range(30..=240)))
        }
        _ => None,
    };

    IncidentRecord {
        team_id,
        incident_id: random_uuid(rng),
        alert_policy_id: random_uuid(rng),
        title: format!("{} alert: {service} - High error rate", severity.as_str()),
        description: format!("Error rate exceeded threshold for {service}"),
        severity,
        status,
        source: INCIDENT_SOURCE.to_string(),
        service_name: service.to_string(),
        created_at,
        updated_at: created_at,
        resolved_at,
        acknowledged_at,
        acknowledged_by,
        attributes: Vec::new(),
    }
}
