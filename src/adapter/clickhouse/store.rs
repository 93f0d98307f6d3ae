use crate::adapter::clickhouse::row::{IncidentRow, LogRow, SpanRow};
use crate::domain::{RecordBatch, RecordKind};
use crate::error::SeederError;
use crate::port::DirectSink;
use clickhouse::Client;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, info};

/// Insert configuration
const INSERT_SEND_TIMEOUT: Duration = Duration::from_secs(30);
const INSERT_END_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the analytics store.
#[derive(Debug, Clone)]
pub struct ClickHouseSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl ClickHouseSettings {
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Direct-mode writer for the analytics store.
#[derive(Clone)]
pub struct ClickHouseStore {
    client: Client,
}

impl ClickHouseStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn from_settings(settings: &ClickHouseSettings) -> Self {
        let client = Client::default()
            .with_url(settings.url())
            .with_user(&settings.user)
            .with_password(&settings.password)
            .with_database(&settings.database);
        Self::new(client)
    }

    /// Round-trips a trivial query. The client connects lazily, so this is
    /// the point where an unreachable store is detected.
    pub async fn ping(&self) -> Result<(), SeederError> {
        self.client
            .query("SELECT 1")
            .fetch_one::<u8>()
            .await
            .map(|_| ())
            .map_err(|e| SeederError::Connection {
                store: "ClickHouse",
                message: e.to_string(),
            })
    }

    pub async fn truncate(&self, kind: RecordKind) -> Result<(), SeederError> {
        let table = kind.table();
        self.client
            .query(&format!("TRUNCATE TABLE IF EXISTS {table}"))
            .execute()
            .await
            .map_err(|source| SeederError::Truncate { table, source })?;
        info!(table, "Truncated table");
        Ok(())
    }

    async fn insert_rows<T>(
        &self,
        table: &'static str,
        rows: impl Iterator<Item = T>,
    ) -> Result<usize, clickhouse::error::Error>
    where
        T: clickhouse::Row + Serialize,
    {
        let mut insert = self
            .client
            .insert::<T>(table)?
            .with_timeouts(Some(INSERT_SEND_TIMEOUT), Some(INSERT_END_TIMEOUT));

        let mut count = 0;
        for row in rows {
            insert.write(&row).await?;
            count += 1;
        }
        insert.end().await?;
        Ok(count)
    }
}

impl DirectSink for ClickHouseStore {
    fn insert<'a>(
        &'a self,
        batch: &'a RecordBatch,
    ) -> Pin<Box<dyn Future<Output = Result<(), SeederError>> + Send + 'a>> {
        Box::pin(async move {
            if batch.is_empty() {
                return Ok(());
            }
            let table = batch.kind().table();
            let result = match batch {
                RecordBatch::Spans(rows) => {
                    self.insert_rows(table, rows.iter().map(SpanRow::from)).await
                }
                RecordBatch::Logs(rows) => {
                    self.insert_rows(table, rows.iter().map(LogRow::from)).await
                }
                RecordBatch::Incidents(rows) => {
                    self.insert_rows(table, rows.iter().map(IncidentRow::from))
                        .await
                }
            };

            match result {
                Ok(count) => {
                    debug!(table, count, "Inserted batch into ClickHouse");
                    Ok(())
                }
                Err(source) => Err(SeederError::Insert {
                    table,
                    rows: batch.len(),
                    source,
                }),
            }
        })
    }
}
