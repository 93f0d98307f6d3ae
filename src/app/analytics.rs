//! Analytics phase: span, log and incident generators feeding the dual-path
//! writer through per-kind accumulators.

use crate::buffer::{Batch, BatchAccumulator};
use crate::config::AnalyticsArgs;
use crate::domain::{DEFAULT_FLUSH_THRESHOLD, Record, RecordKind};
use crate::error::SeederError;
use crate::synth::{synthesize_incident, synthesize_log, synthesize_trace};
use crate::writer::{DualPathWriter, WriteReport};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::{error, info};
use uuid::Uuid;

/// Volumes and batch sizes for one analytics run.
#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub team_ids: Vec<Uuid>,
    pub hours: u32,
    pub traces_per_hour: u32,
    pub logs_per_hour: u32,
    pub incident_days: u32,
    pub incidents_per_day: u32,
    pub span_batch_size: usize,
    pub log_batch_size: usize,
}

impl From<&AnalyticsArgs> for SeedPlan {
    fn from(args: &AnalyticsArgs) -> Self {
        Self {
            team_ids: args.team_ids.clone(),
            hours: args.hours,
            traces_per_hour: args.traces_per_hour,
            logs_per_hour: args.logs_per_hour,
            incident_days: args.incident_days,
            incidents_per_day: args.incidents_per_day,
            span_batch_size: args.span_batch_size,
            log_batch_size: args.log_batch_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOutcome {
    pub kind: RecordKind,
    pub rows: usize,
    pub report: WriteReport,
    /// Set when the generator stopped on a failed insert.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsSummary {
    pub spans: GeneratorOutcome,
    pub logs: GeneratorOutcome,
    pub incidents: GeneratorOutcome,
}

impl AnalyticsSummary {
    #[must_use]
    pub fn failed(&self) -> bool {
        [&self.spans, &self.logs, &self.incidents]
            .iter()
            .any(|outcome| outcome.error.is_some())
    }
}

/// Rows written so far by one generator.
#[derive(Default)]
struct Progress {
    rows: usize,
    report: WriteReport,
}

pub struct AnalyticsSeeder {
    writer: DualPathWriter,
    plan: SeedPlan,
}

impl AnalyticsSeeder {
    #[must_use]
    pub fn new(writer: DualPathWriter, plan: SeedPlan) -> Self {
        Self { writer, plan }
    }

    /// Runs the span, log and incident generators in turn. A generator that
    /// fails is logged and the next one still runs.
    pub async fn run<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Utc>) -> AnalyticsSummary {
        info!(
            mode = %self.writer.mode(),
            teams = self.plan.team_ids.len(),
            hours = self.plan.hours,
            "Starting analytics generation"
        );

        let mut progress = Progress::default();
        let result = self.seed_spans(rng, now, &mut progress).await;
        let spans = finish(RecordKind::Span, progress, result);

        let mut progress = Progress::default();
        let result = self.seed_logs(rng, now, &mut progress).await;
        let logs = finish(RecordKind::Log, progress, result);

        let mut progress = Progress::default();
        let result = self.seed_incidents(rng, now, &mut progress).await;
        let incidents = finish(RecordKind::Incident, progress, result);

        AnalyticsSummary {
            spans,
            logs,
            incidents,
        }
    }

    async fn seed_spans<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        now: DateTime<Utc>,
        progress: &mut Progress,
    ) -> Result<(), SeederError> {
        for &team_id in &self.plan.team_ids {
            let mut accumulator = BatchAccumulator::new(self.plan.span_batch_size);
            for hour in 0..self.plan.hours {
                for _ in 0..self.plan.traces_per_hour {
                    let start = now
                        - Duration::hours(i64::from(hour))
                        - Duration::minutes(rng.random_range(0..=59));
                    for span in synthesize_trace(rng, team_id, start) {
                        self.emit(accumulator.accumulate(span), progress).await?;
                    }
                }
            }
            self.emit(accumulator.flush(), progress).await?;
        }
        Ok(())
    }

    async fn seed_logs<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        now: DateTime<Utc>,
        progress: &mut Progress,
    ) -> Result<(), SeederError> {
        for &team_id in &self.plan.team_ids {
            let mut accumulator = BatchAccumulator::new(self.plan.log_batch_size);
            for hour in 0..self.plan.hours {
                for _ in 0..self.plan.logs_per_hour {
                    let timestamp = now
                        - Duration::hours(i64::from(hour))
                        - Duration::minutes(rng.random_range(0..=59))
                        - Duration::seconds(rng.random_range(0..=59));
                    let log = synthesize_log(rng, team_id, timestamp);
                    self.emit(accumulator.accumulate(log), progress).await?;
                }
            }
            self.emit(accumulator.flush(), progress).await?;
        }
        Ok(())
    }

    async fn seed_incidents<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        now: DateTime<Utc>,
        progress: &mut Progress,
    ) -> Result<(), SeederError> {
        for &team_id in &self.plan.team_ids {
            let mut accumulator = BatchAccumulator::new(DEFAULT_FLUSH_THRESHOLD);
            for day in 0..self.plan.incident_days {
                for _ in 0..self.plan.incidents_per_day {
                    let incident = synthesize_incident(rng, team_id, day, now);
                    self.emit(accumulator.accumulate(incident), progress).await?;
                }
            }
            self.emit(accumulator.flush(), progress).await?;
        }
        Ok(())
    }

    async fn emit<T: Record>(
        &self,
        batch: Option<Batch<T>>,
        progress: &mut Progress,
    ) -> Result<(), SeederError> {
        let Some(batch) = batch else {
            return Ok(());
        };
        let rows = batch.size();
        let batch_id = batch.id().to_string();
        let formed_at = batch.created_at();
        let report = self.writer.write(batch.into()).await?;
        progress.rows += rows;
        progress.report.merge(report);
        info!(
            kind = %T::KIND,
            batch_id = %batch_id,
            rows,
            total = progress.rows,
            elapsed_ms = formed_at.elapsed().as_millis() as u64,
            "Wrote batch"
        );
        Ok(())
    }
}

fn finish(
    kind: RecordKind,
    progress: Progress,
    result: Result<(), SeederError>,
) -> GeneratorOutcome {
    let error = match result {
        Ok(()) => {
            info!(
                kind = %kind,
                rows = progress.rows,
                rest_rows = progress.report.rest_rows,
                direct_rows = progress.report.direct_rows,
                fallback_chunks = progress.report.fallback_chunks,
                "Generator finished"
            );
            None
        }
        Err(e) => {
            error!(kind = %kind, rows = progress.rows, error = %e, "Generator failed");
            Some(e.to_string())
        }
    };
    GeneratorOutcome {
        kind,
        rows: progress.rows,
        report: progress.report,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingSink, ScriptedIngestApi, sample_time};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;
    use tracing_test::traced_test;

    fn plan() -> SeedPlan {
        SeedPlan {
            team_ids: vec![Uuid::from_u128(1), Uuid::from_u128(2)],
            hours: 2,
            traces_per_hour: 3,
            logs_per_hour: 10,
            incident_days: 3,
            incidents_per_day: 2,
            span_batch_size: 5000,
            log_batch_size: 15,
        }
    }

    #[tokio::test]
    async fn batches_never_span_teams() {
        let sink = Arc::new(RecordingSink::new());
        let seeder = AnalyticsSeeder::new(DualPathWriter::direct(sink.clone()), plan());

        let summary = seeder.run(&mut StdRng::seed_from_u64(9), sample_time()).await;

        let log_batches: Vec<_> = sink
            .inserts()
            .into_iter()
            .filter(|(kind, _)| *kind == RecordKind::Log)
            .map(|(_, n)| n)
            .collect();
        assert_eq!(log_batches, vec![15, 5, 15, 5]);
        assert_eq!(summary.logs.rows, 40);

        let span_batches = sink
            .inserts()
            .iter()
            .filter(|(kind, _)| *kind == RecordKind::Span)
            .count();
        assert_eq!(span_batches, 2);
        assert!((36..=60).contains(&summary.spans.rows));

        assert_eq!(summary.incidents.rows, 12);
        assert!(!summary.failed());
        assert_eq!(sink.rows_inserted(), summary.spans.rows + 40 + 12);
    }

    #[tokio::test]
    async fn failing_generator_does_not_stop_the_others() {
        let sink = Arc::new(RecordingSink::new());
        sink.set_should_fail(true);
        let seeder = AnalyticsSeeder::new(DualPathWriter::direct(sink.clone()), plan());

        let summary = seeder.run(&mut StdRng::seed_from_u64(9), sample_time()).await;

        assert!(summary.failed());
        for outcome in [&summary.spans, &summary.logs, &summary.incidents] {
            assert!(outcome.error.is_some(), "{:?}", outcome.kind);
            assert_eq!(outcome.rows, 0);
        }
    }

    #[tokio::test]
    async fn rest_mode_sends_incidents_direct() {
        let api = Arc::new(ScriptedIngestApi::default());
        let sink = Arc::new(RecordingSink::new());
        let writer = DualPathWriter::rest(api.clone(), sink.clone());
        let seeder = AnalyticsSeeder::new(writer, plan());

        let summary = seeder.run(&mut StdRng::seed_from_u64(4), sample_time()).await;

        assert_eq!(summary.logs.report.rest_rows, 40);
        assert_eq!(summary.incidents.report.direct_rows, 12);
        assert_eq!(summary.incidents.report.rest_rows, 0);
        assert!(
            sink.inserts()
                .iter()
                .all(|(kind, _)| *kind == RecordKind::Incident)
        );
        assert!(
            api.accepted()
                .iter()
                .all(|(kind, _)| *kind != RecordKind::Incident)
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn written_batches_are_logged_with_their_id() {
        let sink = Arc::new(RecordingSink::new());
        let seeder = AnalyticsSeeder::new(DualPathWriter::direct(sink.clone()), plan());

        seeder.run(&mut StdRng::seed_from_u64(2), sample_time()).await;

        assert!(logs_contain("Wrote batch"));
        assert!(logs_contain("batch_id="));
    }
}
