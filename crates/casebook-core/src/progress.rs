//! Append-only stage history per case.

use std::collections::HashMap;

use crate::case::CaseId;
use crate::stage::Stage;
use crate::store::CaseStoreError;

/// Per-case progress, keyed by case id.
///
/// A case gets an empty history when it is created and loses it when it is
/// deleted; in between the history only grows.
#[derive(Debug, Clone, Default)]
pub struct ProgressLog {
    histories: HashMap<CaseId, Vec<Stage>>,
}

impl ProgressLog {
    pub(crate) fn open(&mut self, id: CaseId) {
        self.histories.entry(id).or_default();
    }

    pub(crate) fn close(&mut self, id: CaseId) -> Option<Vec<Stage>> {
        self.histories.remove(&id)
    }

    /// Append `stage` to the history of `id`.
    pub(crate) fn append(&mut self, id: CaseId, stage: Stage) -> Result<(), CaseStoreError> {
        let history = self
            .histories
            .get_mut(&id)
            .ok_or(CaseStoreError::NotFound(id))?;
        history.push(stage);
        Ok(())
    }

    /// Stages recorded for `id`, oldest first. Empty when none are recorded.
    pub fn list(&self, id: CaseId) -> &[Stage] {
        self.histories
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, id: CaseId) -> bool {
        self.histories.contains_key(&id)
    }

    /// Case ids that own a history, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = CaseId> + '_ {
        self.histories.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }
}
