//! Casebook CLI: the `casebook` command.

mod cli;
mod commands;
mod config;
mod support;

use clap::Parser;
use cli::{Cli, Commands, ProgressCommands};
use std::path::{Path, PathBuf};
use support::Context;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let config = config::load(cli.config.as_deref().map(Path::new)).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    let default_level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_LEVEL));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let ctx = Context {
        records_path: cli
            .records
            .map(PathBuf::from)
            .unwrap_or(config.records_path),
        undo_log_path: config.undo_log_path,
    };
    tracing::debug!(records = %ctx.records_path.display(), "casebook starting");

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Add {
            id,
            description,
            priority,
            json,
        } => commands::case::run_add(&ctx, id, description, priority, json),

        Commands::Delete { id, json } => commands::case::run_delete(&ctx, id, json),

        Commands::Update {
            id,
            description,
            priority,
            json,
        } => commands::case::run_update(&ctx, id, description, priority, json),

        Commands::List { json } => commands::case::run_list(&ctx, json),

        Commands::Ordered { json } => commands::case::run_ordered(&ctx, json),

        Commands::Progress { command } => match command {
            ProgressCommands::Add { id, stage, json } => {
                commands::progress::run_add(&ctx, id, stage, json)
            }
            ProgressCommands::Show { id, json } => commands::progress::run_show(&ctx, id, json),
        },

        Commands::History { undo_log, json } => commands::history::run(&ctx, undo_log, json),

        Commands::Menu => commands::menu::run(&ctx),
    }
}
