//! Bounded log of accepted placements for backup export.
//!
//! Oldest entries are evicted first once the cap is exceeded. Nothing else
//! influences eviction.

use std::collections::VecDeque;

use crate::MAX_HISTORY;
use crate::placement::PlacementEvent;

pub struct HistoryLog {
    entries: VecDeque<PlacementEvent>,
    max_entries: usize,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::with_limit(MAX_HISTORY)
    }

    pub fn with_limit(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries.min(MAX_HISTORY)),
            max_entries,
        }
    }

    /// Append to the end, then trim the front back down to the cap.
    pub fn append(&mut self, event: PlacementEvent) {
        self.entries.push_back(event);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    /// Every retained entry, oldest first.
    pub fn snapshot(&self) -> Vec<PlacementEvent> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}
