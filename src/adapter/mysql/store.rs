use crate::relational::fixtures::{
    AlertFixture, ApiEndpoint, ChartConfig, OrganizationFixture, ServiceFixture, TeamTemplate,
    UserFixture,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlConnectOptions;
use sqlx::{Connection, MySqlConnection};
use tracing::{info, warn};

/// Children first, so foreign keys never block a delete.
const CLEAR_ORDER: [&str; 8] = [
    "services",
    "alerts",
    "chart_configs",
    "api_endpoints",
    "user_teams",
    "users",
    "teams",
    "organizations",
];

#[derive(Debug, Clone)]
pub struct MySqlSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl MySqlSettings {
    #[must_use]
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }
}

/// One connection for the whole relational phase.
pub struct MySqlStore {
    conn: MySqlConnection,
}

impl MySqlStore {
    pub async fn connect(settings: &MySqlSettings) -> Result<Self> {
        let conn = MySqlConnection::connect_with(&settings.connect_options())
            .await
            .with_context(|| {
                format!(
                    "failed to connect to MySQL at {}:{}/{}",
                    settings.host, settings.port, settings.database
                )
            })?;
        info!(database = %settings.database, "Connected to MySQL");
        Ok(Self { conn })
    }

    /// `api_endpoints` is the only table not created by the backend's schema.
    pub async fn ensure_tables(&mut self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS api_endpoints (
                id BIGINT AUTO_INCREMENT PRIMARY KEY,
                team_id BIGINT NOT NULL,
                endpoint VARCHAR(255) NOT NULL,
                method VARCHAR(10) NOT NULL,
                base_latency DOUBLE NOT NULL,
                base_throughput DOUBLE NOT NULL,
                base_error_rate DOUBLE NOT NULL,
                enabled BOOLEAN DEFAULT TRUE,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                INDEX idx_api_endpoints_team (team_id)
            )
            ",
        )
        .execute(&mut self.conn)
        .await
        .context("failed to create api_endpoints table")?;
        Ok(())
    }

    /// Deletes every seeded row. A failing delete (e.g. missing table) is
    /// logged and skipped.
    pub async fn clear_all(&mut self) {
        for table in CLEAR_ORDER {
            match sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut self.conn)
                .await
            {
                Ok(result) => info!(table, rows = result.rows_affected(), "Cleared table"),
                Err(e) => warn!(table, error = %e, "Failed to clear table, skipping"),
            }
        }
    }

    pub async fn insert_organization(
        &mut self,
        org: &OrganizationFixture,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let result = sqlx::query(
            r"
            INSERT INTO organizations (name, slug, plan, active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(org.name)
        .bind(org.slug)
        .bind(org.plan)
        .bind(true)
        .bind(now)
        .bind(now)
        .execute(&mut self.conn)
        .await
        .context("failed to insert organization")?;
        Ok(result.last_insert_id() as i64)
    }

    pub async fn insert_team(
        &mut self,
        org_id: i64,
        team: &TeamTemplate,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let result = sqlx::query(
            r"
            INSERT INTO teams (name, slug, organization_id, color, active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(team.name)
        .bind(team.slug)
        .bind(org_id)
        .bind(team.color)
        .bind(true)
        .bind(now)
        .bind(now)
        .execute(&mut self.conn)
        .await
        .with_context(|| format!("failed to insert team {}", team.slug))?;
        Ok(result.last_insert_id() as i64)
    }

    pub async fn insert_user(
        &mut self,
        org_id: i64,
        user: &UserFixture,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let result = sqlx::query(
            r"
            INSERT INTO users (email, name, role, organization_id, active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(user.email)
        .bind(user.name)
        .bind(user.role)
        .bind(org_id)
        .bind(true)
        .bind(now)
        .bind(now)
        .execute(&mut self.conn)
        .await
        .with_context(|| format!("failed to insert user {}", user.email))?;
        Ok(result.last_insert_id() as i64)
    }

    pub async fn insert_user_team(
        &mut self,
        user_id: i64,
        team_id: i64,
        role: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_teams (user_id, team_id, role, joined_at) VALUES (?, ?, ?, ?)",
        )
            .bind(user_id)
            .bind(team_id)
            .bind(role)
            .bind(now)
            .execute(&mut self.conn)
            .await
            .with_context(|| format!("failed to add user {user_id} to team {team_id}"))?;
        Ok(())
    }

    pub async fn insert_service(&mut self, org_id: i64, service: &ServiceFixture) -> Result<i64> {
        let result = sqlx::query(
            r"
            INSERT INTO services (organization_id, team_id, name, status, first_seen, last_seen,
                                  metric_count, log_count, trace_count, error_count, error_rate,
                                  version, environment)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(org_id)
        .bind(service.team_id)
        .bind(service.name)
        .bind(service.status)
        .bind(service.first_seen)
        .bind(service.last_seen)
        .bind(service.metric_count)
        .bind(service.log_count)
        .bind(service.trace_count)
        .bind(service.error_count)
        .bind(service.error_rate)
        .bind(service.version)
        .bind(service.environment)
        .execute(&mut self.conn)
        .await
        .with_context(|| format!("failed to insert service {}", service.name))?;
        Ok(result.last_insert_id() as i64)
    }

    pub async fn insert_chart_configs(
        &mut self,
        charts: &[ChartConfig],
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut tx = self.conn.begin().await.context("failed to begin transaction")?;
        for chart in charts {
            sqlx::query(
                r"
                INSERT INTO chart_configs (team_id, page_type, chart_id, title, chart_type, unit,
                                           data_key, percentile, display_order, enabled, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(chart.team_id)
            .bind(chart.page_type)
            .bind(chart.chart_id)
            .bind(&chart.title)
            .bind(chart.chart_type)
            .bind(chart.unit)
            .bind(chart.data_key)
            .bind(chart.percentile)
            .bind(chart.display_order)
            .bind(chart.enabled)
            .bind(now)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to insert chart config {}", chart.chart_id))?;
        }
        tx.commit().await.context("failed to commit chart configs")?;
        Ok(())
    }

    pub async fn insert_api_endpoints(
        &mut self,
        endpoints: &[ApiEndpoint],
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut tx = self.conn.begin().await.context("failed to begin transaction")?;
        for ep in endpoints {
            sqlx::query(
                r"
                INSERT INTO api_endpoints (team_id, endpoint, method, base_latency, base_throughput,
                                           base_error_rate, enabled, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(ep.team_id)
            .bind(&ep.endpoint)
            .bind(ep.method)
            .bind(ep.base_latency)
            .bind(ep.base_throughput)
            .bind(ep.base_error_rate)
            .bind(ep.enabled)
            .bind(now)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to insert api endpoint {}", ep.endpoint))?;
        }
        tx.commit().await.context("failed to commit api endpoints")?;
        Ok(())
    }

    pub async fn insert_alerts(&mut self, org_id: i64, alerts: &[AlertFixture]) -> Result<()> {
        let mut tx = self.conn.begin().await.context("failed to begin transaction")?;
        for alert in alerts {
            sqlx::query(
                r"
                INSERT INTO alerts (organization_id, team_id, name, type, metric, operator,
                                    threshold, severity, service_name, status, current_value,
                                    created_at, triggered_at, acknowledged_at, resolved_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(org_id)
            .bind(alert.team_id)
            .bind(alert.name)
            .bind(alert.kind)
            .bind(alert.metric)
            .bind(alert.operator)
            .bind(alert.threshold)
            .bind(alert.severity)
            .bind(&alert.service_name)
            .bind(alert.status.as_str())
            .bind(alert.current_value)
            .bind(alert.created_at)
            .bind(alert.triggered_at)
            .bind(alert.acknowledged_at)
            .bind(alert.resolved_at)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to insert alert {}", alert.name))?;
        }
        tx.commit().await.context("failed to commit alerts")?;
        Ok(())
    }

    pub async fn close(self) -> Result<()> {
        self.conn
            .close()
            .await
            .context("failed to close MySQL connection")?;
        info!("MySQL connection closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_are_cleared_before_parents() {
        let pos = |t: &str| CLEAR_ORDER.iter().position(|x| *x == t).unwrap();
        assert!(pos("user_teams") < pos("users"));
        assert!(pos("services") < pos("teams"));
        assert!(pos("teams") < pos("organizations"));
    }
}
