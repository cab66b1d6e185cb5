//! # casebook-core
//!
//! Indexed record core for tracked cases.
//!
//! This crate provides:
//! - `CaseRecord` and `Stage` (the tracked data)
//! - `CaseStore` (authoritative state and the only mutation boundary)
//! - `AvlIndex`, `PriorityIndex`, `ProgressLog`, `UndoLog` (derived structures
//!   kept in step by `CaseStore`)
//! - the plain-text records format and `RecordsFile`, its single-writer
//!   file access
//!
//! ## Data model
//!
//! ```text
//! records file (one block per case)
//!     ↕  load / save
//! CaseStore ── HashMap<CaseId, CaseRecord>   authoritative
//!           ├─ AvlIndex                      ascending ids
//!           ├─ PriorityIndex                 (priority, id) min-heap
//!           ├─ ProgressLog                   stages per case
//!           └─ UndoLog                       Added / Deleted history
//! ```

pub mod avl;
pub mod case;
pub mod priority;
pub mod progress;
pub mod records;
pub mod records_file;
pub mod shared;
pub mod stage;
pub mod store;
pub mod undo;

pub use avl::AvlIndex;
pub use case::{CaseId, CaseRecord, CaseSnapshot, Priority};
pub use priority::{PriorityEntry, PriorityIndex};
pub use progress::ProgressLog;
pub use records::{RecordsError, read_records, render_records, write_records};
pub use records_file::{RecordsFile, RecordsFileError};
pub use shared::SharedCaseStore;
pub use stage::Stage;
pub use store::{CaseStore, CaseStoreError};
pub use undo::{
    UNDO_LOG_SCHEMA, UndoEntry, UndoLog, UndoLogError, UndoLogLine, append_undo_entries_to_path,
    read_undo_log, read_undo_log_from_path, write_undo_log,
};
