use std::time::Instant;
use uuid::Uuid;

use crate::domain::{Record, RecordBatch, RecordKind};

/// An ordered, size-bounded group of rows of one kind.
#[derive(Debug, Clone)]
pub struct Batch<T> {
    id: String,
    rows: Vec<T>,
    created_at: Instant,
}

impl<T: Record> Batch<T> {
    fn new(rows: Vec<T>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            rows,
            created_at: Instant::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> RecordKind {
        T::KIND
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }
}

impl<T: Record> From<Batch<T>> for RecordBatch {
    fn from(batch: Batch<T>) -> Self {
        T::into_record_batch(batch.rows)
    }
}

/// Groups rows of one kind into batches of at most `threshold` rows.
///
/// `accumulate` hands back a full batch as soon as the threshold is reached;
/// `flush` hands back whatever is left once the input is exhausted.
#[derive(Debug)]
pub struct BatchAccumulator<T> {
    threshold: usize,
    pending: Vec<T>,
}

impl<T: Record> BatchAccumulator<T> {
    /// A threshold of zero is treated as one.
    pub fn new(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            threshold,
            pending: Vec::with_capacity(threshold),
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn accumulate(&mut self, row: T) -> Option<Batch<T>> {
        self.pending.push(row);
        if self.pending.len() >= self.threshold {
            Some(self.take())
        } else {
            None
        }
    }

    /// Emits the open batch if it holds any rows.
    pub fn flush(&mut self) -> Option<Batch<T>> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.take())
        }
    }

    fn take(&mut self) -> Batch<T> {
        let rows = std::mem::replace(&mut self.pending, Vec::with_capacity(self.threshold));
        Batch::new(rows)
    }
}
