use casebook_core::{
    CaseRecord, CaseStore, CaseStoreError, RecordsFile, UndoEntry, append_undo_entries_to_path,
};
use serde_json::{Value, json};
use std::path::PathBuf;

/// Resolved paths shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub records_path: PathBuf,
    pub undo_log_path: Option<PathBuf>,
}

impl Context {
    pub fn records_file(&self) -> RecordsFile {
        RecordsFile::new(&self.records_path)
    }
}

/// Load the records file; a missing file is an empty store.
pub fn load_store_or_exit(ctx: &Context) -> CaseStore {
    ctx.records_file().load().unwrap_or_else(|e| {
        eprintln!(
            "error: failed to load {}: {e}",
            ctx.records_path.display()
        );
        std::process::exit(1);
    })
}

/// Run one store mutation under the records lock and persist it.
///
/// Structural mutations are appended to the undo log when one is configured.
pub fn mutate_store_or_exit<T>(
    ctx: &Context,
    mutator: impl FnOnce(&mut CaseStore) -> Result<T, CaseStoreError>,
) -> T {
    let result = ctx.records_file().update(|store| {
        let value = mutator(store)?;
        Ok((value, store.undo_log().entries().to_vec()))
    });

    match result {
        Ok((value, recorded)) => {
            export_undo_entries(ctx, &recorded);
            value
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

/// Append undo entries to the configured audit log.
///
/// The records file is already saved at this point, so a failed export is
/// reported but does not fail the command.
pub fn export_undo_entries(ctx: &Context, entries: &[UndoEntry]) {
    let Some(path) = ctx.undo_log_path.as_ref() else {
        return;
    };
    if let Err(e) = append_undo_entries_to_path(path, entries) {
        tracing::warn!(path = %path.display(), "failed to export undo entries: {e}");
        eprintln!("warning: failed to write undo log {}: {e}", path.display());
    }
}

pub fn record_json(record: &CaseRecord) -> Value {
    json!({
        "id": record.id(),
        "description": record.description(),
        "priority": record.priority()
    })
}

pub fn print_json(payload: &Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(payload).expect("json serialization")
    );
}
