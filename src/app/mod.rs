pub mod analytics;
pub mod tracing;

use crate::adapter::clickhouse::ClickHouseStore;
use crate::adapter::rest::{IngestClient, IngestClientConfig};
use crate::config::{AnalyticsArgs, Command, Config, RelationalArgs};
use crate::domain::RecordKind;
use crate::error::SeederError;
use crate::relational::{RelationalSeeder, RelationalSummary};
use crate::writer::DualPathWriter;
use analytics::{AnalyticsSeeder, AnalyticsSummary, SeedPlan};
use chrono::Utc;
use std::sync::Arc;

/// Runs the phases selected by the subcommand. Relational runs before analytics.
pub async fn run(config: Config) -> Result<(), SeederError> {
    match &config.command {
        Command::Relational(args) => {
            run_relational(args, config.clear).await?;
        }
        Command::Analytics(args) => {
            run_analytics(args, config.clear).await?;
        }
        Command::All {
            relational,
            analytics,
        } => {
            run_relational(relational, config.clear).await?;
            run_analytics(analytics, config.clear).await?;
        }
    }
    Ok(())
}

pub async fn run_relational(
    args: &RelationalArgs,
    clear: bool,
) -> Result<RelationalSummary, SeederError> {
    let settings = args.mysql_settings();
    let seeder = RelationalSeeder::connect(&settings)
        .await
        .map_err(|e| SeederError::Connection {
            store: "MySQL",
            message: format!("{e:#}"),
        })?;

    let summary = seeder.run(&mut rand::rng(), Utc::now(), clear).await?;
    ::tracing::info!(
        teams = summary.teams,
        services = summary.services,
        chart_configs = summary.chart_configs,
        api_endpoints = summary.api_endpoints,
        alerts = summary.alerts,
        "Relational seeding complete"
    );
    Ok(summary)
}

/// Connects to ClickHouse, optionally truncates, then runs every generator.
/// Only an unreachable store is an error; generator failures are reported in
/// the summary.
pub async fn run_analytics(
    args: &AnalyticsArgs,
    clear: bool,
) -> Result<AnalyticsSummary, SeederError> {
    let store = Arc::new(ClickHouseStore::from_settings(&args.clickhouse_settings()));
    store.ping().await?;
    ::tracing::info!(database = %args.clickhouse_database, "Connected to ClickHouse");

    if clear {
        for kind in RecordKind::ALL {
            if let Err(e) = store.truncate(kind).await {
                ::tracing::warn!(table = kind.table(), error = %e, "Truncate failed, continuing");
            }
        }
    }

    let writer = build_writer(args, store)?;
    let seeder = AnalyticsSeeder::new(writer, SeedPlan::from(args));
    let summary = seeder.run(&mut rand::rng(), Utc::now()).await;

    if summary.failed() {
        ::tracing::warn!("Analytics seeding finished with failed generators");
    } else {
        ::tracing::info!(
            spans = summary.spans.rows,
            logs = summary.logs.rows,
            incidents = summary.incidents.rows,
            "Analytics seeding complete"
        );
    }
    Ok(summary)
}

/// REST mode when an auth token is configured, direct mode otherwise.
fn build_writer(
    args: &AnalyticsArgs,
    store: Arc<ClickHouseStore>,
) -> Result<DualPathWriter, SeederError> {
    match &args.auth_token {
        Some(token) => {
            let client = IngestClient::new(IngestClientConfig::new(&args.api_url, token))?;
            ::tracing::info!(api_url = %args.api_url, "Using REST ingestion with direct fallback");
            Ok(DualPathWriter::rest(Arc::new(client), store)
                .with_rest_chunk_size(args.rest_chunk_size))
        }
        None => {
            ::tracing::info!("No auth token configured, inserting directly into ClickHouse");
            Ok(DualPathWriter::direct(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::WriteMode;
    use clap::Parser;

    fn analytics_args(extra: &[&str]) -> AnalyticsArgs {
        let args = ["observex-seeder", "analytics"].into_iter().chain(extra.iter().copied());
        match Config::try_parse_from(args).unwrap().command {
            Command::Analytics(args) => args,
            other => panic!("Expected analytics command, got: {other:?}"),
        }
    }

    fn store(args: &AnalyticsArgs) -> Arc<ClickHouseStore> {
        Arc::new(ClickHouseStore::from_settings(&args.clickhouse_settings()))
    }

    #[test]
    fn auth_token_selects_rest_mode() {
        let args = analytics_args(&["--auth-token", "secret", "--api-url", "http://backend:8080"]);
        let writer = build_writer(&args, store(&args)).unwrap();
        assert_eq!(writer.mode(), WriteMode::Rest);
    }

    #[test]
    fn missing_auth_token_selects_direct_mode() {
        let mut args = analytics_args(&[]);
        args.auth_token = None;
        let writer = build_writer(&args, store(&args)).unwrap();
        assert_eq!(writer.mode(), WriteMode::Direct);
    }

    #[test]
    fn unparsable_api_url_fails_writer_construction() {
        let args = analytics_args(&["--auth-token", "secret", "--api-url", "not a url"]);
        let result = build_writer(&args, store(&args));
        assert!(matches!(result, Err(SeederError::Ingest(_))));
    }
}
