//! Structural mutation history.
//!
//! `UndoLog` records every Add and Delete in order. Nothing consumes it yet:
//! it is an audit trail, and there is no rollback.
//!
//! `casebook.undo.v1` is the JSONL envelope used when a session exports its
//! entries to disk: one line per entry, appended, never rewritten.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::case::CaseId;

pub const UNDO_LOG_SCHEMA: &str = "casebook.undo.v1";

fn default_undo_log_schema() -> String {
    UNDO_LOG_SCHEMA.to_string()
}

/// One structural mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UndoEntry {
    Added { case_id: CaseId },
    Deleted { case_id: CaseId },
}

impl UndoEntry {
    pub fn case_id(&self) -> CaseId {
        match self {
            UndoEntry::Added { case_id } | UndoEntry::Deleted { case_id } => *case_id,
        }
    }
}

/// Push-only record of structural mutations.
#[derive(Debug, Clone, Default)]
pub struct UndoLog {
    entries: Vec<UndoEntry>,
}

impl UndoLog {
    pub fn record(&mut self, entry: UndoEntry) {
        self.entries.push(entry);
    }

    /// Recorded entries, oldest first.
    pub fn entries(&self) -> &[UndoEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One exported audit line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoLogLine {
    #[serde(default = "default_undo_log_schema")]
    pub schema: String,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub entry: UndoEntry,
}

impl UndoLogLine {
    pub fn new(entry: UndoEntry, recorded_at: DateTime<Utc>) -> Self {
        Self {
            schema: UNDO_LOG_SCHEMA.to_string(),
            recorded_at,
            entry,
        }
    }

    /// Parse line `line_no` of an export. Blank and `#` lines hold no entry.
    fn parse(line_no: usize, text: &str) -> Result<Option<Self>, UndoLogError> {
        let text = text.trim();
        if text.is_empty() || text.starts_with('#') {
            return Ok(None);
        }
        let line: Self =
            serde_json::from_str(text).map_err(|e| UndoLogError::Parse(line_no, e.to_string()))?;
        if line.schema != UNDO_LOG_SCHEMA {
            return Err(UndoLogError::UnsupportedSchema(line.schema));
        }
        Ok(Some(line))
    }
}

/// Every entry line of an export, in file order.
pub fn read_undo_log(reader: impl BufRead) -> Result<Vec<UndoLogLine>, UndoLogError> {
    reader
        .lines()
        .zip(1..)
        .filter_map(|(text, line_no)| match text {
            Ok(text) => UndoLogLine::parse(line_no, &text).transpose(),
            Err(e) => Some(Err(UndoLogError::Io(format!("line {line_no}: {e}")))),
        })
        .collect()
}

/// Write `lines` as one JSON object per line, in a single write.
pub fn write_undo_log(writer: &mut impl Write, lines: &[UndoLogLine]) -> Result<(), UndoLogError> {
    let mut payload = String::new();
    for line in lines {
        payload += &serde_json::to_string(line).map_err(|e| UndoLogError::Serialize(e.to_string()))?;
        payload.push('\n');
    }
    writer
        .write_all(payload.as_bytes())
        .map_err(|e| UndoLogError::Io(e.to_string()))
}

pub fn read_undo_log_from_path(path: impl AsRef<Path>) -> Result<Vec<UndoLogLine>, UndoLogError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    read_undo_log(BufReader::new(file))
}

/// Append `entries` to the export at `path`, all stamped with the current
/// time. Earlier lines are never rewritten.
pub fn append_undo_entries_to_path(
    path: impl AsRef<Path>,
    entries: &[UndoEntry],
) -> Result<(), UndoLogError> {
    let path = path.as_ref();
    if entries.is_empty() {
        return Ok(());
    }
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
    }

    let recorded_at = Utc::now();
    let lines: Vec<UndoLogLine> = entries
        .iter()
        .map(|&entry| UndoLogLine::new(entry, recorded_at))
        .collect();

    let mut export = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io_error(path, e))?;
    write_undo_log(&mut export, &lines)?;
    export.sync_data().map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, e: std::io::Error) -> UndoLogError {
    UndoLogError::Io(format!("{}: {e}", path.display()))
}

/// Errors from the undo-log audit export.
#[derive(Debug, thiserror::Error)]
pub enum UndoLogError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("line {0}: parse error: {1}")]
    Parse(usize, String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("unsupported undo-log schema: {0}")]
    UnsupportedSchema(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "casebook-undo-{prefix}-{}-{unique}.jsonl",
            std::process::id()
        ))
    }

    #[test]
    fn entries_serialize_with_action_tag() {
        let json = serde_json::to_value(UndoEntry::Deleted { case_id: 12 }).expect("serialize");
        assert_eq!(json["action"], "deleted");
        assert_eq!(json["case_id"], 12);
    }

    #[test]
    fn record_keeps_order() {
        let mut log = UndoLog::default();
        log.record(UndoEntry::Added { case_id: 1 });
        log.record(UndoEntry::Deleted { case_id: 1 });
        assert_eq!(
            log.entries(),
            &[
                UndoEntry::Added { case_id: 1 },
                UndoEntry::Deleted { case_id: 1 }
            ]
        );
        assert_eq!(log.entries()[1].case_id(), 1);
    }

    #[test]
    fn append_accumulates_across_calls() {
        let path = temp_path("append");
        append_undo_entries_to_path(&path, &[UndoEntry::Added { case_id: 4 }])
            .expect("first append");
        append_undo_entries_to_path(
            &path,
            &[
                UndoEntry::Added { case_id: 5 },
                UndoEntry::Deleted { case_id: 4 },
            ],
        )
        .expect("second append");

        let lines = read_undo_log_from_path(&path).expect("read back");
        let entries: Vec<UndoEntry> = lines.iter().map(|line| line.entry).collect();
        assert_eq!(
            entries,
            vec![
                UndoEntry::Added { case_id: 4 },
                UndoEntry::Added { case_id: 5 },
                UndoEntry::Deleted { case_id: 4 },
            ]
        );
        assert!(lines.iter().all(|line| line.schema == UNDO_LOG_SCHEMA));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn read_rejects_foreign_schema() {
        let payload = "{\"schema\":\"other.v9\",\"recorded_at\":\"2024-01-01T00:00:00Z\",\"action\":\"added\",\"case_id\":1}\n";
        let err = read_undo_log(payload.as_bytes()).expect_err("schema must be checked");
        assert!(matches!(err, UndoLogError::UnsupportedSchema(schema) if schema == "other.v9"));
    }

    #[test]
    fn read_reports_one_based_line_numbers() {
        let payload = "# audit\n{not json}\n";
        let err = read_undo_log(payload.as_bytes()).expect_err("bad line must fail");
        assert!(matches!(err, UndoLogError::Parse(2, _)));
    }

    #[test]
    fn read_skips_comments_and_blank_lines() {
        let payload = "# audit\n\n{\"recorded_at\":\"2024-01-01T00:00:00Z\",\"action\":\"added\",\"case_id\":3}\n";
        let lines = read_undo_log(payload.as_bytes()).expect("parse");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].entry, UndoEntry::Added { case_id: 3 });
        assert_eq!(lines[0].schema, UNDO_LOG_SCHEMA);
    }
}
