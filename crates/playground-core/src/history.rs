//! Bounded, most-recent-first error log with a selectable "current" entry.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::ErrorRecord;

/// Identity of one recorded entry. Assigned on insert, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone)]
pub struct ErrorHistory {
    /// Front is the newest entry.
    entries: VecDeque<(RecordId, ErrorRecord)>,
    capacity: usize,
    current: Option<RecordId>,
    next_id: u64,
}

impl Default for ErrorHistory {
    fn default() -> Self {
        Self::with_capacity(5)
    }
}

impl ErrorHistory {
    /// `capacity` is clamped to at least 1.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
            current: None,
            next_id: 1,
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepend `record`, evict beyond capacity from the old end, and make it
    /// the current error.
    pub fn record(&mut self, record: ErrorRecord) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.entries.push_front((id, record));
        while self.entries.len() > self.capacity {
            if let Some((evicted, _)) = self.entries.pop_back() {
                debug!(
                    target: "playground::history",
                    evicted = evicted.0,
                    capacity = self.capacity,
                    "evicted oldest error record"
                );
            }
        }
        self.current = Some(id);
        id
    }

    /// Hide the current error. Stored entries are untouched.
    pub fn clear_current(&mut self) {
        self.current = None;
    }

    /// Make an entry already in the history current. Returns `false` (and
    /// changes nothing) if `id` is not present.
    pub fn select(&mut self, id: RecordId) -> bool {
        if self.get(id).is_some() {
            self.current = Some(id);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn current_id(&self) -> Option<RecordId> {
        self.current
    }

    #[must_use]
    pub fn current(&self) -> Option<&ErrorRecord> {
        self.current.and_then(|id| self.get(id))
    }

    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&ErrorRecord> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, record)| record)
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = (RecordId, &ErrorRecord)> + '_ {
        self.entries.iter().map(|(id, record)| (*id, record))
    }

    /// Every entry except the newest.
    pub fn older(&self) -> impl Iterator<Item = (RecordId, &ErrorRecord)> + '_ {
        self.entries().skip(1)
    }
}
