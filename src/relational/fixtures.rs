//! Pure builders for the relational demo dataset. Nothing here touches the
//! database; ids assigned by MySQL are passed in.

use crate::synth::{pick, team_rng};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

pub struct OrganizationFixture {
    pub name: &'static str,
    pub slug: &'static str,
    pub plan: &'static str,
}

pub const ORGANIZATION: OrganizationFixture = OrganizationFixture {
    name: "ObserveX Demo",
    slug: "observex-demo",
    plan: "enterprise",
};

pub struct TeamTemplate {
    pub name: &'static str,
    pub slug: &'static str,
    pub color: &'static str,
}

pub const TEAMS: [TeamTemplate; 3] = [
    TeamTemplate {
        name: "Platform Team",
        slug: "platform",
        color: "#774FF8",
    },
    TeamTemplate {
        name: "Backend Team",
        slug: "backend",
        color: "#12B76A",
    },
    TeamTemplate {
        name: "Frontend Team",
        slug: "frontend",
        color: "#F79009",
    },
];

pub struct UserFixture {
    pub email: &'static str,
    pub name: &'static str,
    pub role: &'static str,
}

pub const DEMO_USER: UserFixture = UserFixture {
    email: crate::domain::catalog::DEMO_USER_EMAIL,
    name: "Demo User",
    role: "admin",
};

/// A persisted team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// The demo user administers the first team and is a member of the rest.
#[must_use]
pub fn membership_role(team_index: usize) -> &'static str {
    if team_index == 0 { "admin" } else { "member" }
}

#[must_use]
pub fn service_names_for(slug: &str) -> &'static [&'static str] {
    match slug {
        "platform" => &[
            "api-gateway",
            "auth-service",
            "user-service",
            "notification-service",
        ],
        "backend" => &[
            "order-service",
            "payment-service",
            "inventory-service",
            "shipping-service",
        ],
        "frontend" => &["web-app", "mobile-bff", "cdn-service", "analytics-service"],
        _ => &["default-service"],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceFixture {
    pub team_id: i64,
    pub name: &'static str,
    pub status: &'static str,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub metric_count: i64,
    pub log_count: i64,
    pub trace_count: i64,
    pub error_count: i64,
    pub error_rate: f64,
    pub version: &'static str,
    pub environment: &'static str,
}

pub fn services<R: Rng + ?Sized>(
    rng: &mut R,
    team: &Team,
    now: DateTime<Utc>,
) -> Vec<ServiceFixture> {
    service_names_for(&team.slug)
        .iter()
        .map(|&name| ServiceFixture {
            team_id: team.id,
            name,
            status: "healthy",
            first_seen: now - Duration::days(30),
            last_seen: now,
            metric_count: rng.random_range(1000..=10_000),
            log_count: rng.random_range(5000..=50_000),
            trace_count: rng.random_range(100..=1000),
            error_count: rng.random_range(10..=100),
            error_rate: rng.random_range(0.1..2.0),
            version: "1.0.0",
            environment: "production",
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub team_id: i64,
    pub page_type: &'static str,
    pub chart_id: &'static str,
    pub title: String,
    pub chart_type: &'static str,
    pub unit: &'static str,
    pub data_key: &'static str,
    pub percentile: Option<i32>,
    pub display_order: i32,
    pub enabled: bool,
}

// (chart_id, title, chart_type, unit, data_key, percentile)
type ChartTemplate = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    Option<i32>,
);

const OVERVIEW_CHARTS: [ChartTemplate; 4] = [
    ("latency", "Latency Overview", "line", "ms", "latencyData", None),
    ("throughput", "Throughput", "line", "req/min", "throughputData", None),
    ("errorRate", "Error Rate", "line", "%", "errorRateData", None),
    ("serviceLatency", "Service Latency", "bar", "ms", "serviceLatency", None),
];

const METRICS_CHARTS: [ChartTemplate; 4] = [
    ("latency", "Latency Trends", "line", "ms", "latencyData", None),
    ("throughput", "Throughput Trends", "line", "req/min", "throughputData", None),
    ("errorRate", "Error Rate Trends", "line", "%", "errorData", None),
    ("p99", "P99 Latency", "line", "ms", "latencyData", Some(99)),
];

/// Four `overview` and four `metrics` charts. The overview latency chart is
/// titled after the team.
#[must_use]
pub fn chart_configs(team: &Team) -> Vec<ChartConfig> {
    let mut configs = Vec::with_capacity(OVERVIEW_CHARTS.len() + METRICS_CHARTS.len());
    for (page_type, charts) in [("overview", &OVERVIEW_CHARTS), ("metrics", &METRICS_CHARTS)] {
        for (i, &(chart_id, title, chart_type, unit, data_key, percentile)) in
            charts.iter().enumerate()
        {
            let title = if page_type == "overview" && chart_id == "latency" {
                format!("{title} - {}", team.slug)
            } else {
                title.to_string()
            };
            configs.push(ChartConfig {
                team_id: team.id,
                page_type,
                chart_id,
                title,
                chart_type,
                unit,
                data_key,
                percentile,
                display_order: i as i32 + 1,
                enabled: true,
            });
        }
    }
    configs
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiEndpoint {
    pub team_id: i64,
    pub endpoint: String,
    pub method: &'static str,
    pub base_latency: f64,
    pub base_throughput: f64,
    pub base_error_rate: f64,
    pub enabled: bool,
}

/// Six endpoints whose baselines depend only on the team id.
#[must_use]
pub fn api_endpoints(team: &Team) -> Vec<ApiEndpoint> {
    const TEMPLATES: [(&str, &str); 6] = [
        ("GET", "users"),
        ("POST", "data"),
        ("GET", "status"),
        ("PUT", "config"),
        ("DELETE", "cache"),
        ("GET", "metrics"),
    ];

    let mut rng = team_rng(team.id);
    TEMPLATES
        .iter()
        .map(|&(method, resource)| {
            let path = format!("/api/v1/{}/{resource}", team.slug);
            ApiEndpoint {
                team_id: team.id,
                endpoint: format!("{method} {path}"),
                method,
                base_latency: 30.0 + rng.random::<f64>() * 150.0,
                base_throughput: 100.0 + rng.random::<f64>() * 500.0,
                base_error_rate: 0.1 + rng.random::<f64>() * 3.0,
                enabled: true,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
    Muted,
}

impl AlertStatus {
    pub const ALL: [AlertStatus; 4] = [
        AlertStatus::Active,
        AlertStatus::Acknowledged,
        AlertStatus::Resolved,
        AlertStatus::Muted,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Acknowledged => "acknowledged",
            AlertStatus::Resolved => "resolved",
            AlertStatus::Muted => "muted",
        }
    }
}

struct AlertTemplate {
    name: &'static str,
    metric: &'static str,
    operator: &'static str,
    threshold: f64,
    severity: &'static str,
    kind: &'static str,
}

const fn template(
    name: &'static str,
    metric: &'static str,
    operator: &'static str,
    threshold: f64,
    severity: &'static str,
    kind: &'static str,
) -> AlertTemplate {
    AlertTemplate {
        name,
        metric,
        operator,
        threshold,
        severity,
        kind,
    }
}

const ALERT_TEMPLATES: [AlertTemplate; 10] = [
    template("High API Latency", "api.latency", ">", 1000.0, "critical", "metric"),
    template("High Error Rate", "error.rate", ">", 5.0, "critical", "metric"),
    template("Low Throughput", "throughput", "<", 100.0, "warning", "metric"),
    template("High Memory Usage", "memory.usage", ">", 85.0, "warning", "apm"),
    template("High CPU Usage", "cpu.usage", ">", 80.0, "warning", "apm"),
    template("Database Connection Pool", "db.connections", ">", 90.0, "critical", "metric"),
    template("Request Queue Depth", "queue.depth", ">", 1000.0, "warning", "metric"),
    template("Cache Hit Rate Low", "cache.hit_rate", "<", 80.0, "info", "metric"),
    template("Error Log Spike", "log.error_count", ">", 100.0, "critical", "log"),
    template("Slow Trace Detected", "trace.duration", ">", 5000.0, "warning", "trace"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct AlertFixture {
    pub team_id: i64,
    pub name: &'static str,
    pub kind: &'static str,
    pub metric: &'static str,
    pub operator: &'static str,
    pub threshold: f64,
    pub severity: &'static str,
    pub service_name: String,
    pub status: AlertStatus,
    pub current_value: f64,
    pub created_at: DateTime<Utc>,
    pub triggered_at: Option<DateTime<Utc>>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// One alert per template, services assigned round-robin. Empty when the team
/// has no services.
pub fn alerts<R: Rng + ?Sized>(
    rng: &mut R,
    team: &Team,
    services: &[String],
    now: DateTime<Utc>,
) -> Vec<AlertFixture> {
    if services.is_empty() {
        return Vec::new();
    }

    ALERT_TEMPLATES
        .iter()
        .enumerate()
        .map(|(i, template)| {
            let status = *pick(&AlertStatus::ALL, rng);
            let created_at = now - Duration::days(rng.random_range(1..=30));
            let triggered_at = (status != AlertStatus::Muted)
                .then(|| now - Duration::hours(rng.random_range(1..=48)));
            let acknowledged_at = triggered_at
                .filter(|_| matches!(status, AlertStatus::Acknowledged | AlertStatus::Resolved))
                .map(|t| t + Duration::minutes(rng.random_range(5..=30)));
            let resolved_at = acknowledged_at
                .filter(|_| status == AlertStatus::Resolved)
                .map(|t| t + Duration::hours(rng.random_range(1..=4)));

            AlertFixture {
                team_id: team.id,
                name: template.name,
                kind: template.kind,
                metric: template.metric,
                operator: template.operator,
                threshold: template.threshold,
                severity: template.severity,
                service_name: services[i % services.len()].clone(),
                status,
                current_value: current_value(rng, template, status),
                created_at,
                triggered_at,
                acknowledged_at,
                resolved_at,
            }
        })
        .collect()
}

/// Breaching for active alerts, healthy otherwise; rounded to two decimals.
fn current_value<R: Rng + ?Sized>(
    rng: &mut R,
    template: &AlertTemplate,
    status: AlertStatus,
) -> f64 {
    let active = status == AlertStatus::Active;
    let factor = match (template.operator, active) {
        (">", true) => 1.0 + rng.random_range(0.1..=0.5),
        (">", false) => rng.random_range(0.5..=0.9),
        (_, true) => 1.0 - rng.random_range(0.1..=0.5),
        (_, false) => rng.random_range(1.1..=1.5),
    };
    (template.threshold * factor * 100.0).round() / 100.0
}
