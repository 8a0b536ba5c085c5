//! Append-only record buffer shared between a worker and its controller.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::models::BusinessRecord;

/// Append-only log of records produced by one task's worker.
///
/// The worker appends; the controller copies a snapshot. Appends made after a
/// snapshot are never visible through that snapshot.
#[derive(Debug, Clone, Default)]
pub struct RecordLog {
    records: Arc<Mutex<Vec<BusinessRecord>>>,
}

impl RecordLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one record.
    pub fn append(&self, record: BusinessRecord) {
        self.records.lock().push(record);
    }

    /// Number of records appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether nothing has been appended yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Copies the records appended so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<BusinessRecord> {
        self.records.lock().clone()
    }
}
