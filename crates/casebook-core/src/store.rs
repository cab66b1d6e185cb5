//! Authoritative case state and the indexes derived from it.
//!
//! `CaseStore` is the only mutation boundary:
//! - the record map is written first
//! - then the AVL key index and the priority index
//! - then the undo log
//!
//! Preconditions are checked before anything is touched, so a failed call
//! leaves every structure as it was.

use std::collections::{BTreeSet, HashMap};

use crate::avl::AvlIndex;
use crate::case::{CaseId, CaseRecord, CaseSnapshot, Priority};
use crate::priority::{PriorityEntry, PriorityIndex};
use crate::progress::ProgressLog;
use crate::stage::Stage;
use crate::undo::{UndoEntry, UndoLog};

/// Domain failures returned by `CaseStore`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaseStoreError {
    #[error("case already exists: {0}")]
    IdCollision(CaseId),

    #[error("case not found: {0}")]
    NotFound(CaseId),
}

/// Canonical in-memory case state.
#[derive(Debug, Clone, Default)]
pub struct CaseStore {
    cases: HashMap<CaseId, CaseRecord>,
    progress: ProgressLog,
    by_key: AvlIndex,
    by_priority: PriorityIndex,
    undo: UndoLog,
}

impl CaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from snapshots, e.g. a parsed records file.
    ///
    /// Cases go through the same insertion path as `add`, but hydration is
    /// not a session mutation: the undo log starts empty.
    pub fn from_snapshots(
        snapshots: impl IntoIterator<Item = CaseSnapshot>,
    ) -> Result<Self, CaseStoreError> {
        let mut store = Self::default();
        for snapshot in snapshots {
            let id = snapshot.record.id();
            store.insert_record(snapshot.record)?;
            for stage in snapshot.progress {
                store.progress.append(id, stage)?;
            }
        }
        store.rebuild_priority_index();
        Ok(store)
    }

    /// Create a case with an empty progress history.
    pub fn add(
        &mut self,
        id: CaseId,
        description: impl Into<String>,
        priority: Priority,
    ) -> Result<(), CaseStoreError> {
        if let Err(err) = self.insert_record(CaseRecord::new(id, description, priority)) {
            tracing::warn!(case_id = id, "add rejected: {err}");
            return Err(err);
        }
        self.rebuild_priority_index();
        self.undo.record(UndoEntry::Added { case_id: id });
        tracing::debug!(case_id = id, priority, "case added");
        Ok(())
    }

    /// Remove a case and its progress history. Returns the removed record.
    pub fn delete(&mut self, id: CaseId) -> Result<CaseRecord, CaseStoreError> {
        if !self.cases.contains_key(&id) {
            tracing::warn!(case_id = id, "delete rejected: case not found");
            return Err(CaseStoreError::NotFound(id));
        }

        // Logged against the pre-delete state.
        self.undo.record(UndoEntry::Deleted { case_id: id });
        let record = self
            .cases
            .remove(&id)
            .ok_or(CaseStoreError::NotFound(id))?;
        self.progress.close(id);
        self.by_key.delete(id);
        self.rebuild_priority_index();
        tracing::debug!(case_id = id, "case deleted");
        Ok(record)
    }

    /// Overwrite description and priority of an existing case.
    pub fn update(
        &mut self,
        id: CaseId,
        description: impl Into<String>,
        priority: Priority,
    ) -> Result<(), CaseStoreError> {
        let Some(record) = self.cases.get_mut(&id) else {
            tracing::warn!(case_id = id, "update rejected: case not found");
            return Err(CaseStoreError::NotFound(id));
        };
        record.rewrite(description.into(), priority);
        self.rebuild_priority_index();
        tracing::debug!(case_id = id, priority, "case updated");
        Ok(())
    }

    /// Append a workflow stage to the case's progress history.
    pub fn append_progress(&mut self, id: CaseId, stage: Stage) -> Result<(), CaseStoreError> {
        if let Err(err) = self.progress.append(id, stage) {
            tracing::warn!(case_id = id, "progress rejected: {err}");
            return Err(err);
        }
        tracing::debug!(case_id = id, "progress appended");
        Ok(())
    }

    pub fn get(&self, id: CaseId) -> Option<&CaseRecord> {
        self.cases.get(&id)
    }

    pub fn contains(&self, id: CaseId) -> bool {
        self.cases.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// All cases, most urgent first; ties broken by ascending id.
    pub fn list_by_priority(&self) -> Vec<&CaseRecord> {
        self.by_priority
            .snapshot_ordered()
            .into_iter()
            .filter_map(|entry| self.cases.get(&entry.id))
            .collect()
    }

    /// All cases in ascending id order.
    pub fn list_ordered_by_key(&self) -> Vec<&CaseRecord> {
        self.by_key
            .iter()
            .filter_map(|id| self.cases.get(&id))
            .collect()
    }

    /// Progress history of a case, oldest first.
    pub fn list_progress(&self, id: CaseId) -> Result<&[Stage], CaseStoreError> {
        if !self.cases.contains_key(&id) {
            return Err(CaseStoreError::NotFound(id));
        }
        Ok(self.progress.list(id))
    }

    /// Every case with its progress, in ascending id order.
    pub fn snapshots(&self) -> Vec<CaseSnapshot> {
        self.list_ordered_by_key()
            .into_iter()
            .map(|record| CaseSnapshot {
                record: record.clone(),
                progress: self.progress.list(record.id()).to_vec(),
            })
            .collect()
    }

    pub fn key_index(&self) -> &AvlIndex {
        &self.by_key
    }

    pub fn priority_index(&self) -> &PriorityIndex {
        &self.by_priority
    }

    pub fn progress_log(&self) -> &ProgressLog {
        &self.progress
    }

    pub fn undo_log(&self) -> &UndoLog {
        &self.undo
    }

    /// Cross-check the record map against every derived structure.
    ///
    /// Holds after every public operation: the AVL index is well formed and
    /// lists exactly the stored ids, the progress log covers the same ids,
    /// and the priority index mirrors the records' `(priority, id)` pairs.
    pub fn is_consistent(&self) -> bool {
        let ids: BTreeSet<CaseId> = self.cases.keys().copied().collect();
        let progress_ids: BTreeSet<CaseId> = self.progress.ids().collect();
        let expected_keys: Vec<CaseId> = ids.iter().copied().collect();

        let mut expected_priority: Vec<PriorityEntry> =
            self.cases.values().map(PriorityEntry::from).collect();
        expected_priority.sort();

        self.by_key.is_well_formed()
            && self.by_key.len() == ids.len()
            && self.by_key.in_order() == expected_keys
            && progress_ids == ids
            && self.by_priority.snapshot_ordered() == expected_priority
    }

    fn insert_record(&mut self, record: CaseRecord) -> Result<(), CaseStoreError> {
        let id = record.id();
        if self.cases.contains_key(&id) {
            return Err(CaseStoreError::IdCollision(id));
        }
        self.cases.insert(id, record);
        self.progress.open(id);
        self.by_key.insert(id);
        Ok(())
    }

    fn rebuild_priority_index(&mut self) {
        self.by_priority.rebuild(self.cases.values());
    }
}
