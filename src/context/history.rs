//! Bounded execution history.
//!
//! Keeps the most recent executions, newest first, for audit and listing.
//! The log is shared between concurrent requests; every access takes one
//! mutex, held only for the in-memory update or copy.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use super::ExecutionRecord;

/// Default number of executions kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

#[derive(Debug)]
pub struct HistoryLog {
    entries: Mutex<VecDeque<ExecutionRecord>>,
    capacity: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    // A panic elsewhere cannot leave the deque half-updated, so a poisoned
    // lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, VecDeque<ExecutionRecord>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert `record` as the newest entry, dropping the oldest past capacity.
    pub fn append(&self, record: ExecutionRecord) {
        let mut entries = self.lock();
        entries.push_front(record);
        entries.truncate(self.capacity);
    }

    /// Up to `limit` newest entries, newest first. `0` means all.
    pub fn recent(&self, limit: usize) -> Vec<ExecutionRecord> {
        self.page(limit).0
    }

    /// `recent(limit)` together with the total held, read atomically.
    pub fn page(&self, limit: usize) -> (Vec<ExecutionRecord>, usize) {
        let entries = self.lock();
        let total = entries.len();
        let take = if limit == 0 { total } else { limit.min(total) };
        (entries.iter().take(take).cloned().collect(), total)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
