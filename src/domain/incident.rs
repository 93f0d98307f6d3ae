use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }

    #[must_use]
    pub const fn priority(self) -> &'static str {
        match self {
            Severity::Critical => "P1",
            _ => "P2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentStatus {
    Open,
    Acknowledged,
    Resolved,
}

impl IncidentStatus {
    pub const ALL: [IncidentStatus; 3] = [
        IncidentStatus::Open,
        IncidentStatus::Acknowledged,
        IncidentStatus::Resolved,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            IncidentStatus::Open => "OPEN",
            IncidentStatus::Acknowledged => "ACKNOWLEDGED",
            IncidentStatus::Resolved => "RESOLVED",
        }
    }

    #[must_use]
    pub const fn is_acknowledged(self) -> bool {
        matches!(self, IncidentStatus::Acknowledged | IncidentStatus::Resolved)
    }
}

/// Alert lifecycle record.
///
/// Invariant: `created_at <= acknowledged_at <= resolved_at` for the
/// timestamps that are set; `acknowledged_at` is set whenever `resolved_at` is.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentRecord {
    pub team_id: Uuid,
    pub incident_id: Uuid,
    pub alert_policy_id: Uuid,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub status: IncidentStatus,
    pub source: String,
    pub service_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub acknowledged_by: Option<String>,
    pub attributes: Vec<(String, String)>,
}
