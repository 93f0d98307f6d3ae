use thiserror::Error;

use crate::adapter::rest::IngestError;

#[derive(Error, Debug)]
pub enum SeederError {
    #[error("Failed to connect to {store}: {message}")]
    Connection {
        store: &'static str,
        message: String,
    },

    #[error("Failed to truncate table {table}: {source}")]
    Truncate {
        table: &'static str,
        #[source]
        source: clickhouse::error::Error,
    },

    #[error("Direct insert of {rows} rows into {table} failed: {source}")]
    Insert {
        table: &'static str,
        rows: usize,
        #[source]
        source: clickhouse::error::Error,
    },

    #[error("REST ingestion failed: {0}")]
    Ingest(#[from] IngestError),

    #[error("Relational seeding failed: {0:#}")]
    Relational(#[from] anyhow::Error),
}
