//! Bounded, ordered record of past diagnoses.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tracing::debug;

use crate::report::ErrorReport;

/// Number of entries returned by a history query when no limit is given.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Number of entries retained before the oldest are dropped.
pub const DEFAULT_HISTORY_CAPACITY: usize = 500;

/// Append-only ring of [`ErrorReport`]s in insertion order.
///
/// All operations take a single lock, so concurrent appends never
/// interleave or get lost, and `clear` is atomic to readers.
#[derive(Debug)]
pub struct History {
    entries: Mutex<VecDeque<ErrorReport>>,
    capacity: usize,
}

impl History {
    /// Create a history retaining at most `capacity` reports (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            capacity,
        }
    }

    /// Append a report, evicting the oldest one if full.
    pub fn record(&self, report: ErrorReport) {
        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        debug!("Recorded report {} ({})", report.id(), report.category());
        entries.push_back(report);
    }

    /// The `limit` most recent reports, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<ErrorReport> {
        let entries = self.entries.lock();
        let skip = entries.len().saturating_sub(limit);
        entries.iter().skip(skip).cloned().collect()
    }

    /// Every retained report, oldest first.
    pub fn all(&self) -> Vec<ErrorReport> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry.
    pub fn clear(&self) {
        debug!("Clearing error history");
        self.entries.lock().clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
