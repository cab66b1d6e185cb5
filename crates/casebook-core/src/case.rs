//! Case record: the unit of state owned by `CaseStore`.

use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// Unique, immutable case key.
pub type CaseId = i64;

/// Case priority. Lower values are more urgent.
pub type Priority = i64;

/// A tracked case.
///
/// The id is fixed at construction. Description and priority are only
/// rewritten through `CaseStore::update`, which keeps the priority index
/// in step with the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    id: CaseId,
    description: String,
    priority: Priority,
}

impl CaseRecord {
    pub fn new(id: CaseId, description: impl Into<String>, priority: Priority) -> Self {
        Self {
            id,
            description: description.into(),
            priority,
        }
    }

    pub fn id(&self) -> CaseId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub(crate) fn rewrite(&mut self, description: String, priority: Priority) {
        self.description = description;
        self.priority = priority;
    }
}

/// A case together with its recorded progress, in insertion order.
///
/// This is the unit the records file reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSnapshot {
    pub record: CaseRecord,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub progress: Vec<Stage>,
}
