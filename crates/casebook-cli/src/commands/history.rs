use crate::support::{Context, print_json};
use casebook_core::{UndoEntry, read_undo_log_from_path};
use serde_json::json;
use std::path::PathBuf;

pub fn run(ctx: &Context, undo_log: Option<String>, json_output: bool) {
    let Some(path) = undo_log
        .map(PathBuf::from)
        .or_else(|| ctx.undo_log_path.clone())
    else {
        eprintln!("error: no undo log configured (set undo_log_path or pass --undo-log)");
        std::process::exit(1);
    };

    let lines = if path.exists() {
        read_undo_log_from_path(&path).unwrap_or_else(|e| {
            eprintln!("error: failed to read {}: {e}", path.display());
            std::process::exit(1);
        })
    } else {
        Vec::new()
    };

    if json_output {
        print_json(&json!({
            "action": "history",
            "undoLogPath": path.display().to_string(),
            "count": lines.len(),
            "entries": lines
        }));
        return;
    }

    if lines.is_empty() {
        println!("No history recorded.");
        return;
    }
    for line in &lines {
        let verb = match line.entry {
            UndoEntry::Added { .. } => "ADD",
            UndoEntry::Deleted { .. } => "DEL",
        };
        println!(
            "{} {verb} {}",
            line.recorded_at.to_rfc3339(),
            line.entry.case_id()
        );
    }
}
