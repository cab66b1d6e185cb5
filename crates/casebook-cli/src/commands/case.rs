use crate::support::{Context, load_store_or_exit, mutate_store_or_exit, print_json, record_json};
use casebook_core::{CaseRecord, CaseStoreError};
use serde_json::json;

pub fn run_add(ctx: &Context, id: i64, description: String, priority: i64, json_output: bool) {
    let record = mutate_store_or_exit(ctx, |store| {
        store.add(id, description, priority)?;
        store.get(id).cloned().ok_or(CaseStoreError::NotFound(id))
    });

    if json_output {
        print_json(&json!({
            "action": "case.add",
            "recordsPath": ctx.records_path.display().to_string(),
            "case": record_json(&record)
        }));
    } else {
        println!(
            "casebook add\n  Added: {} (priority {})\n  Path: {}",
            record.id(),
            record.priority(),
            ctx.records_path.display()
        );
    }
}

pub fn run_delete(ctx: &Context, id: i64, json_output: bool) {
    let removed = mutate_store_or_exit(ctx, |store| store.delete(id));

    if json_output {
        print_json(&json!({
            "action": "case.delete",
            "recordsPath": ctx.records_path.display().to_string(),
            "case": record_json(&removed)
        }));
    } else {
        println!(
            "casebook delete\n  Deleted: {}\n  Path: {}",
            removed.id(),
            ctx.records_path.display()
        );
    }
}

pub fn run_update(
    ctx: &Context,
    id: i64,
    description: String,
    priority: i64,
    json_output: bool,
) {
    let record = mutate_store_or_exit(ctx, |store| {
        store.update(id, description, priority)?;
        store.get(id).cloned().ok_or(CaseStoreError::NotFound(id))
    });

    if json_output {
        print_json(&json!({
            "action": "case.update",
            "recordsPath": ctx.records_path.display().to_string(),
            "case": record_json(&record)
        }));
    } else {
        println!(
            "casebook update\n  Updated: {} (priority {})\n  Path: {}",
            record.id(),
            record.priority(),
            ctx.records_path.display()
        );
    }
}

pub fn run_list(ctx: &Context, json_output: bool) {
    let store = load_store_or_exit(ctx);
    let rows = store.list_by_priority();

    if json_output {
        print_json(&json!({
            "action": "case.list",
            "recordsPath": ctx.records_path.display().to_string(),
            "count": rows.len(),
            "cases": rows.iter().map(|record| record_json(record)).collect::<Vec<_>>()
        }));
        return;
    }

    if rows.is_empty() {
        println!("No cases available.");
        return;
    }
    println!("Priority Order (lower = higher priority):");
    for record in rows {
        println!("{}", priority_row(record));
    }
}

pub fn run_ordered(ctx: &Context, json_output: bool) {
    let store = load_store_or_exit(ctx);
    let ids: Vec<i64> = store.key_index().in_order();

    if json_output {
        print_json(&json!({
            "action": "case.ordered",
            "recordsPath": ctx.records_path.display().to_string(),
            "ids": ids
        }));
    } else {
        println!("Cases by id: {}", join_ids(&ids));
    }
}

pub fn priority_row(record: &CaseRecord) -> String {
    format!(
        "Case ID: {} | Priority: {} | Description: {}",
        record.id(),
        record.priority(),
        record.description()
    )
}

pub fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
