pub mod client;
pub mod payload;

pub use client::{IngestClient, IngestClientConfig};
pub use payload::{LogPayload, SpanPayload};

use crate::domain::RecordKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("No ingestion endpoint for {0}")]
    UnsupportedKind(RecordKind),
}
