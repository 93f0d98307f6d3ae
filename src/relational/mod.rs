//! Relational phase: the organization, teams, demo user, services, charts,
//! API endpoints and alert rules the dashboards read from MySQL.

pub mod fixtures;

use crate::adapter::mysql::{MySqlSettings, MySqlStore};
use anyhow::Result;
use chrono::{DateTime, Utc};
use fixtures::{DEMO_USER, ORGANIZATION, TEAMS, Team};
use rand::Rng;
use tracing::{info, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelationalSummary {
    pub teams: usize,
    pub services: usize,
    pub chart_configs: usize,
    pub api_endpoints: usize,
    pub alerts: usize,
}

pub struct RelationalSeeder {
    store: MySqlStore,
}

impl RelationalSeeder {
    pub async fn connect(settings: &MySqlSettings) -> Result<Self> {
        Ok(Self {
            store: MySqlStore::connect(settings).await?,
        })
    }

    /// Seeds the full relational dataset, optionally clearing it first. The
    /// first failing statement aborts the phase.
    pub async fn run<R: Rng + ?Sized>(
        mut self,
        rng: &mut R,
        now: DateTime<Utc>,
        clear: bool,
    ) -> Result<RelationalSummary> {
        let seeded = self.seed(rng, now, clear).await;
        let closed = self.store.close().await;
        settle(seeded, closed)
    }

    async fn seed<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now: DateTime<Utc>,
        clear: bool,
    ) -> Result<RelationalSummary> {
        let store = &mut self.store;
        store.ensure_tables().await?;
        if clear {
            store.clear_all().await;
        }

        let org_id = store.insert_organization(&ORGANIZATION, now).await?;
        info!(org_id, name = ORGANIZATION.name, "Created organization");

        let mut teams = Vec::with_capacity(TEAMS.len());
        for template in &TEAMS {
            let id = store.insert_team(org_id, template, now).await?;
            info!(team_id = id, name = template.name, "Created team");
            teams.push(Team {
                id,
                name: template.name.to_string(),
                slug: template.slug.to_string(),
            });
        }

        let user_id = store.insert_user(org_id, &DEMO_USER, now).await?;
        for (index, team) in teams.iter().enumerate() {
            store
                .insert_user_team(user_id, team.id, fixtures::membership_role(index), now)
                .await?;
        }
        info!(user_id, email = DEMO_USER.email, teams = teams.len(), "Created demo user");

        let mut summary = RelationalSummary {
            teams: teams.len(),
            ..RelationalSummary::default()
        };

        for team in &teams {
            let mut service_names = Vec::new();
            for service in fixtures::services(rng, team, now) {
                store.insert_service(org_id, &service).await?;
                service_names.push(service.name.to_string());
            }

            let charts = fixtures::chart_configs(team);
            store.insert_chart_configs(&charts, now).await?;

            let endpoints = fixtures::api_endpoints(team);
            store.insert_api_endpoints(&endpoints, now).await?;

            let alerts = fixtures::alerts(rng, team, &service_names, now);
            store.insert_alerts(org_id, &alerts).await?;

            info!(
                team = %team.name,
                services = service_names.len(),
                charts = charts.len(),
                endpoints = endpoints.len(),
                alerts = alerts.len(),
                "Seeded team"
            );

            summary.services += service_names.len();
            summary.chart_configs += charts.len();
            summary.api_endpoints += endpoints.len();
            summary.alerts += alerts.len();
        }

        Ok(summary)
    }
}

/// The seeding outcome wins; a failed close is only logged.
fn settle(seeded: Result<RelationalSummary>, closed: Result<()>) -> Result<RelationalSummary> {
    if let Err(e) = closed {
        warn!(error = %format!("{e:#}"), "Failed to close MySQL connection");
    }
    seeded
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn seeding_error_survives_a_failed_close() {
        let seeded: Result<RelationalSummary> =
            Err(anyhow::anyhow!("duplicate entry").context("failed to insert team"));
        let closed: Result<()> = Err(anyhow::anyhow!("broken pipe"));

        let err = settle(seeded, closed).unwrap_err();

        assert!(format!("{err:#}").contains("duplicate entry"));
        assert!(logs_contain("Failed to close MySQL connection"));
        assert!(logs_contain("broken pipe"));
    }

    #[test]
    #[traced_test]
    fn failed_close_does_not_discard_a_successful_run() {
        let summary = RelationalSummary {
            teams: 3,
            ..RelationalSummary::default()
        };

        let settled = settle(Ok(summary), Err(anyhow::anyhow!("broken pipe"))).unwrap();

        assert_eq!(settled, summary);
        assert!(logs_contain("Failed to close MySQL connection"));
    }
}
