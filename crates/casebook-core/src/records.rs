//! Records format: the plain-text export of every case.
//!
//! One block per case, blocks separated by a blank line:
//!
//! ```text
//! Case ID: 7
//! Description: Disputed boundary wall
//! Priority: 2
//! Progress:
//! - Case Registered
//! - Under Investigation
//!
//! Case ID: 9
//! Description: Noise complaint
//! Priority: 5
//! Progress:
//! (no progress)
//! ```
//!
//! The reader accepts what the writer produces, and also a bare
//! `Description:` or `-` line whose trailing space was stripped.
//! File access and locking live in `records_file`.

use std::io::{BufRead, Write};

use crate::case::{CaseId, CaseRecord, CaseSnapshot, Priority};
use crate::stage::Stage;
use crate::store::CaseStoreError;

const CASE_ID_PREFIX: &str = "Case ID: ";
const DESCRIPTION_PREFIX: &str = "Description: ";
const PRIORITY_PREFIX: &str = "Priority: ";
const PROGRESS_HEADER: &str = "Progress:";
const NO_PROGRESS: &str = "(no progress)";
const STAGE_PREFIX: &str = "- ";

/// Write case blocks to `writer`.
///
/// Text containing a line break cannot be represented and is rejected.
pub fn write_records(
    writer: &mut impl Write,
    snapshots: &[CaseSnapshot],
) -> Result<(), RecordsError> {
    for snapshot in snapshots {
        let record = &snapshot.record;
        ensure_single_line(record.id(), "description", record.description())?;
        for stage in &snapshot.progress {
            ensure_single_line(record.id(), "stage", stage.label())?;
        }

        let io = |e: std::io::Error| RecordsError::Io(e.to_string());
        writeln!(writer, "{CASE_ID_PREFIX}{}", record.id()).map_err(io)?;
        writeln!(writer, "{DESCRIPTION_PREFIX}{}", record.description()).map_err(io)?;
        writeln!(writer, "{PRIORITY_PREFIX}{}", record.priority()).map_err(io)?;
        writeln!(writer, "{PROGRESS_HEADER}").map_err(io)?;
        if snapshot.progress.is_empty() {
            writeln!(writer, "{NO_PROGRESS}").map_err(io)?;
        }
        for stage in &snapshot.progress {
            writeln!(writer, "{STAGE_PREFIX}{stage}").map_err(io)?;
        }
        writeln!(writer).map_err(io)?;
    }
    Ok(())
}

/// Render case blocks to a string.
pub fn render_records(snapshots: &[CaseSnapshot]) -> Result<String, RecordsError> {
    let mut buf = Vec::new();
    write_records(&mut buf, snapshots)?;
    String::from_utf8(buf).map_err(|e| RecordsError::Corrupt(e.to_string()))
}

fn ensure_single_line(id: CaseId, field: &str, text: &str) -> Result<(), RecordsError> {
    if text.contains(['\n', '\r']) {
        return Err(RecordsError::Unrepresentable(format!(
            "case {id}: {field} contains a line break"
        )));
    }
    Ok(())
}

/// Read case blocks from `reader`.
pub fn read_records(reader: impl BufRead) -> Result<Vec<CaseSnapshot>, RecordsError> {
    let mut lines = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| RecordsError::Io(format!("line {}: {e}", line_no + 1)))?;
        lines.push(line);
    }

    let mut cursor = LineCursor::new(&lines);
    let mut snapshots = Vec::new();
    loop {
        cursor.skip_blank();
        if cursor.at_end() {
            break;
        }
        snapshots.push(cursor.block()?);
    }
    Ok(snapshots)
}

/// Text after `prefix`. An empty value may have lost the separating space
/// to an editor that strips trailing whitespace, so the bare prefix also
/// counts.
fn field_value<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix)
        .or_else(|| (line == prefix.trim_end()).then_some(""))
}

struct LineCursor<'a> {
    lines: &'a [String],
    pos: usize,
}

impl<'a> LineCursor<'a> {
    fn new(lines: &'a [String]) -> Self {
        Self { lines, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.lines.len()
    }

    fn skip_blank(&mut self) {
        while self
            .lines
            .get(self.pos)
            .is_some_and(|line| line.trim().is_empty())
        {
            self.pos += 1;
        }
    }

    /// 1-based number of the line under the cursor.
    fn line_no(&self) -> usize {
        self.pos + 1
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).map(String::as_str)
    }

    fn expect_prefixed(&mut self, prefix: &str) -> Result<&'a str, RecordsError> {
        let line_no = self.line_no();
        let line = self.peek().ok_or_else(|| {
            RecordsError::Parse(line_no, format!("expected `{prefix}`, got end of file"))
        })?;
        let rest = field_value(line, prefix).ok_or_else(|| {
            RecordsError::Parse(line_no, format!("expected `{prefix}`, got `{line}`"))
        })?;
        self.pos += 1;
        Ok(rest)
    }

    fn expect_integer(&mut self, prefix: &str) -> Result<i64, RecordsError> {
        let line_no = self.line_no();
        let raw = self.expect_prefixed(prefix)?;
        raw.trim()
            .parse::<i64>()
            .map_err(|e| RecordsError::Parse(line_no, format!("invalid integer `{raw}`: {e}")))
    }

    fn block(&mut self) -> Result<CaseSnapshot, RecordsError> {
        let id: CaseId = self.expect_integer(CASE_ID_PREFIX)?;
        let description = self.expect_prefixed(DESCRIPTION_PREFIX)?.to_string();
        let priority: Priority = self.expect_integer(PRIORITY_PREFIX)?;

        let line_no = self.line_no();
        if self.peek() != Some(PROGRESS_HEADER) {
            return Err(RecordsError::Parse(
                line_no,
                format!("expected `{PROGRESS_HEADER}`"),
            ));
        }
        self.pos += 1;

        let mut progress = Vec::new();
        if self.peek() == Some(NO_PROGRESS) {
            self.pos += 1;
        } else {
            while let Some(label) = self.peek().and_then(|line| field_value(line, STAGE_PREFIX)) {
                progress.push(Stage::from_label(label));
                self.pos += 1;
            }
            if progress.is_empty() {
                return Err(RecordsError::Parse(
                    self.line_no(),
                    format!("expected `{NO_PROGRESS}` or a `{STAGE_PREFIX}<stage>` line"),
                ));
            }
        }

        if let Some(line) = self.peek()
            && !line.trim().is_empty()
        {
            return Err(RecordsError::Parse(
                self.line_no(),
                format!("expected blank line after case {id}, got `{line}`"),
            ));
        }

        Ok(CaseSnapshot {
            record: CaseRecord::new(id, description, priority),
            progress,
        })
    }
}

/// Errors from records file operations.
#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("line {0}: parse error: {1}")]
    Parse(usize, String),

    #[error("cannot write records: {0}")]
    Unrepresentable(String),

    #[error("corrupted records file: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Store(#[from] CaseStoreError),
}
