//! Seams between the dual-path writer and the stores it writes to.
//!
//! Both traits are dyn-compatible by returning boxed futures instead of
//! `impl Future`, so the writer can hold them behind `Arc<dyn ..>`.

use crate::adapter::rest::IngestError;
use crate::domain::RecordBatch;
use crate::error::SeederError;
use std::future::Future;
use std::pin::Pin;

/// Bulk insertion against the analytics store's native protocol.
pub trait DirectSink: Send + Sync {
    /// Inserts every row of `batch` in one bulk call, in the kind's column order.
    fn insert<'a>(
        &'a self,
        batch: &'a RecordBatch,
    ) -> Pin<Box<dyn Future<Output = Result<(), SeederError>> + Send + 'a>>;
}

/// Authenticated REST ingestion endpoint.
pub trait IngestApi: Send + Sync {
    /// Posts `batch` as one request. Any failure, including a non-2xx status,
    /// is reported as an [`IngestError`].
    fn post<'a>(
        &'a self,
        batch: &'a RecordBatch,
    ) -> Pin<Box<dyn Future<Output = Result<(), IngestError>> + Send + 'a>>;
}
