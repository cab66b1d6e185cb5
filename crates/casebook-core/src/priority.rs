//! Priority-ordered view over every case in the store.
//!
//! The index is rebuilt wholesale from the authoritative records after each
//! mutation instead of being patched in place, so it cannot drift from the
//! store. Reads drain a clone of the heap and leave the live one untouched.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::case::{CaseId, CaseRecord, Priority};

/// `(priority, id)` pair. Field order gives the lexicographic ordering:
/// priority ascending, then id ascending.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PriorityEntry {
    pub priority: Priority,
    pub id: CaseId,
}

impl From<&CaseRecord> for PriorityEntry {
    fn from(record: &CaseRecord) -> Self {
        Self {
            priority: record.priority(),
            id: record.id(),
        }
    }
}

/// Min-heap of `PriorityEntry`.
#[derive(Debug, Clone, Default)]
pub struct PriorityIndex {
    heap: BinaryHeap<Reverse<PriorityEntry>>,
}

impl PriorityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard the current content and repopulate from `records`.
    pub fn rebuild<'a>(&mut self, records: impl IntoIterator<Item = &'a CaseRecord>) {
        self.heap = records
            .into_iter()
            .map(|record| Reverse(PriorityEntry::from(record)))
            .collect();
        tracing::debug!(entries = self.heap.len(), "priority index rebuilt");
    }

    /// Ascending `(priority, id)` listing. Does not mutate the live heap.
    pub fn snapshot_ordered(&self) -> Vec<PriorityEntry> {
        let mut heap = self.heap.clone();
        let mut ordered = Vec::with_capacity(heap.len());
        while let Some(Reverse(entry)) = heap.pop() {
            ordered.push(entry);
        }
        ordered
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
