use crate::support::{Context, load_store_or_exit, mutate_store_or_exit, print_json};
use casebook_core::Stage;
use serde_json::json;

pub fn run_add(ctx: &Context, id: i64, stage: String, json_output: bool) {
    let stage = Stage::parse_name(&stage);
    let history = mutate_store_or_exit(ctx, |store| {
        store.append_progress(id, stage.clone())?;
        store.list_progress(id).map(<[Stage]>::to_vec)
    });

    if json_output {
        print_json(&json!({
            "action": "progress.add",
            "recordsPath": ctx.records_path.display().to_string(),
            "caseId": id,
            "stage": stage,
            "progress": history
        }));
    } else {
        println!("casebook progress add\n  Added: {stage}\n  Progress for Case ID {id}:");
        for stage in &history {
            println!("  - {stage}");
        }
    }
}

pub fn run_show(ctx: &Context, id: i64, json_output: bool) {
    let store = load_store_or_exit(ctx);
    let history = store.list_progress(id).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    if json_output {
        print_json(&json!({
            "action": "progress.show",
            "recordsPath": ctx.records_path.display().to_string(),
            "caseId": id,
            "progress": history
        }));
        return;
    }

    if history.is_empty() {
        println!("No progress recorded.");
        return;
    }
    println!("Progress for Case ID {id}:");
    for stage in history {
        println!("- {stage}");
    }
}
