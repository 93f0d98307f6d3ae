//! Dual-path writer: bulk inserts straight into the analytics store, or posts
//! through the backend's ingestion API with a per-chunk direct fallback.

use crate::domain::RecordBatch;
use crate::error::SeederError;
use crate::port::{DirectSink, IngestApi};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Maximum rows per REST request.
pub const DEFAULT_REST_CHUNK_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Direct,
    Rest,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::Direct => f.write_str("direct"),
            WriteMode::Rest => f.write_str("rest"),
        }
    }
}

/// Where the rows of one or more `write` calls ended up.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    pub rest_rows: usize,
    pub direct_rows: usize,
    pub fallback_chunks: usize,
}

impl WriteReport {
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.rest_rows + self.direct_rows
    }

    pub fn merge(&mut self, other: WriteReport) {
        self.rest_rows += other.rest_rows;
        self.direct_rows += other.direct_rows;
        self.fallback_chunks += other.fallback_chunks;
    }
}

enum Strategy {
    Direct {
        store: Arc<dyn DirectSink>,
    },
    Rest {
        api: Arc<dyn IngestApi>,
        fallback: Arc<dyn DirectSink>,
        chunk_size: usize,
    },
}

pub struct DualPathWriter {
    strategy: Strategy,
}

impl DualPathWriter {
    #[must_use]
    pub fn direct(store: Arc<dyn DirectSink>) -> Self {
        Self {
            strategy: Strategy::Direct { store },
        }
    }

    #[must_use]
    pub fn rest(api: Arc<dyn IngestApi>, fallback: Arc<dyn DirectSink>) -> Self {
        Self {
            strategy: Strategy::Rest {
                api,
                fallback,
                chunk_size: DEFAULT_REST_CHUNK_SIZE,
            },
        }
    }

    /// Overrides the REST chunk size. No effect in direct mode; zero is treated as one.
    #[must_use]
    pub fn with_rest_chunk_size(mut self, size: usize) -> Self {
        if let Strategy::Rest { chunk_size, .. } = &mut self.strategy {
            *chunk_size = size.max(1);
        }
        self
    }

    #[must_use]
    pub fn mode(&self) -> WriteMode {
        match self.strategy {
            Strategy::Direct { .. } => WriteMode::Direct,
            Strategy::Rest { .. } => WriteMode::Rest,
        }
    }

    /// Persists every row of `batch` exactly once.
    ///
    /// In REST mode a failed chunk is inserted directly and never re-posted.
    /// Only a failing direct insert is returned as an error.
    pub async fn write(&self, batch: RecordBatch) -> Result<WriteReport, SeederError> {
        if batch.is_empty() {
            return Ok(WriteReport::default());
        }

        match &self.strategy {
            Strategy::Direct { store } => {
                store.insert(&batch).await?;
                Ok(WriteReport {
                    direct_rows: batch.len(),
                    ..WriteReport::default()
                })
            }
            Strategy::Rest { fallback, .. } if batch.kind().ingest_path().is_none() => {
                fallback.insert(&batch).await?;
                Ok(WriteReport {
                    direct_rows: batch.len(),
                    ..WriteReport::default()
                })
            }
            Strategy::Rest {
                api,
                fallback,
                chunk_size,
            } => {
                let kind = batch.kind();
                let chunks = batch.into_chunks(*chunk_size);
                let total = chunks.len();
                let mut report = WriteReport::default();

                for (index, chunk) in chunks.into_iter().enumerate() {
                    let rows = chunk.len();
                    match api.post(&chunk).await {
                        Ok(()) => {
                            debug!(
                                kind = %kind,
                                chunk = index + 1,
                                total,
                                rows,
                                "Chunk ingested via REST"
                            );
                            report.rest_rows += rows;
                        }
                        Err(e) => {
                            warn!(
                                kind = %kind,
                                chunk = index + 1,
                                total,
                                rows,
                                error = %e,
                                "REST ingestion failed, falling back to direct insert"
                            );
                            fallback.insert(&chunk).await?;
                            report.direct_rows += rows;
                            report.fallback_chunks += 1;
                        }
                    }
                }
                Ok(report)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordKind;
    use crate::test_support::{
        RecordingSink, ScriptedIngestApi, sample_incident, sample_logs, sample_spans,
    };
    use tracing_test::traced_test;

    fn rest_writer(
        api: &Arc<ScriptedIngestApi>,
        sink: &Arc<RecordingSink>,
    ) -> DualPathWriter {
        DualPathWriter::rest(api.clone(), sink.clone())
    }

    #[tokio::test]
    async fn direct_mode_inserts_whole_batch_once() {
        let sink = Arc::new(RecordingSink::new());
        let writer = DualPathWriter::direct(sink.clone());

        let report = writer.write(RecordBatch::Logs(sample_logs(5000))).await.unwrap();

        assert_eq!(writer.mode(), WriteMode::Direct);
        assert_eq!(sink.inserts(), vec![(RecordKind::Log, 5000)]);
        assert_eq!(report.direct_rows, 5000);
        assert_eq!(report.rest_rows, 0);
    }

    #[tokio::test]
    async fn direct_mode_propagates_insert_failure() {
        let sink = Arc::new(RecordingSink::new());
        sink.set_should_fail(true);
        let writer = DualPathWriter::direct(sink.clone());

        let result = writer.write(RecordBatch::Spans(sample_spans(3))).await;

        assert!(matches!(result, Err(SeederError::Insert { table: "spans", rows: 3, .. })));
    }

    #[tokio::test]
    async fn rest_mode_splits_into_chunks() {
        let api = Arc::new(ScriptedIngestApi::default());
        let sink = Arc::new(RecordingSink::new());
        let writer = rest_writer(&api, &sink);

        let report = writer.write(RecordBatch::Logs(sample_logs(2500))).await.unwrap();

        assert_eq!(writer.mode(), WriteMode::Rest);
        assert_eq!(
            api.accepted(),
            vec![(RecordKind::Log, 1000), (RecordKind::Log, 1000), (RecordKind::Log, 500)]
        );
        assert!(sink.inserts().is_empty());
        assert_eq!(report.rest_rows, 2500);
        assert_eq!(report.fallback_chunks, 0);
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_middle_chunk_falls_back_alone() {
        let api = Arc::new(ScriptedIngestApi::failing_on([1]));
        let sink = Arc::new(RecordingSink::new());
        let writer = rest_writer(&api, &sink);

        let report = writer.write(RecordBatch::Logs(sample_logs(3000))).await.unwrap();

        assert_eq!(api.calls(), 3);
        assert_eq!(api.accepted().len(), 2);
        assert_eq!(sink.inserts(), vec![(RecordKind::Log, 1000)]);
        assert_eq!(
            report,
            WriteReport {
                rest_rows: 2000,
                direct_rows: 1000,
                fallback_chunks: 1,
            }
        );
        assert!(logs_contain("falling back to direct insert"));
    }

    #[tokio::test]
    async fn failed_chunk_is_not_retried_over_rest() {
        let api = Arc::new(ScriptedIngestApi::failing_on([0]));
        let sink = Arc::new(RecordingSink::new());
        let writer = rest_writer(&api, &sink);

        let report = writer.write(RecordBatch::Spans(sample_spans(10))).await.unwrap();

        assert_eq!(api.calls(), 1);
        assert_eq!(report.direct_rows, 10);
        assert_eq!(report.rest_rows, 0);
    }

    #[tokio::test]
    async fn fallback_failure_is_fatal() {
        let api = Arc::new(ScriptedIngestApi::failing_on([0]));
        let sink = Arc::new(RecordingSink::new());
        sink.set_should_fail(true);
        let writer = rest_writer(&api, &sink);

        let result = writer.write(RecordBatch::Logs(sample_logs(10))).await;

        assert!(matches!(result, Err(SeederError::Insert { .. })));
    }

    #[tokio::test]
    async fn incidents_bypass_rest() {
        let api = Arc::new(ScriptedIngestApi::default());
        let sink = Arc::new(RecordingSink::new());
        let writer = rest_writer(&api, &sink);

        let report = writer
            .write(RecordBatch::Incidents(vec![sample_incident(), sample_incident()]))
            .await
            .unwrap();

        assert_eq!(api.calls(), 0);
        assert_eq!(sink.inserts(), vec![(RecordKind::Incident, 2)]);
        assert_eq!(report.direct_rows, 2);
        assert_eq!(report.fallback_chunks, 0);
    }

    #[tokio::test]
    async fn custom_chunk_size_is_honored() {
        let api = Arc::new(ScriptedIngestApi::default());
        let sink = Arc::new(RecordingSink::new());
        let writer = rest_writer(&api, &sink).with_rest_chunk_size(400);

        writer.write(RecordBatch::Logs(sample_logs(1000))).await.unwrap();

        let sizes: Vec<_> = api.accepted().into_iter().map(|(_, n)| n).collect();
        assert_eq!(sizes, vec![400, 400, 200]);
    }

    #[tokio::test]
    async fn empty_batch_touches_nothing() {
        let api = Arc::new(ScriptedIngestApi::default());
        let sink = Arc::new(RecordingSink::new());
        let writer = rest_writer(&api, &sink);

        let report = writer.write(RecordBatch::Logs(Vec::new())).await.unwrap();

        assert_eq!(report, WriteReport::default());
        assert_eq!(api.calls(), 0);
        assert!(sink.inserts().is_empty());
    }

    #[test]
    fn reports_merge() {
        let mut total = WriteReport {
            rest_rows: 10,
            direct_rows: 5,
            fallback_chunks: 1,
        };
        total.merge(WriteReport {
            rest_rows: 1,
            direct_rows: 2,
            fallback_chunks: 0,
        });
        assert_eq!(total.total_rows(), 18);
        assert_eq!(total.fallback_chunks, 1);
    }
}
