use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "casebook",
    about = "Casebook: track cases by id, priority and workflow progress",
    version
)]
pub struct Cli {
    /// Path to the records file (overrides `records_path` from config)
    #[arg(long, global = true, env = "CASEBOOK_RECORDS")]
    pub records: Option<String>,

    /// Path to casebook.toml
    #[arg(long, global = true, env = "CASEBOOK_CONFIG")]
    pub config: Option<String>,

    /// Log debug events to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Subcommand; the interactive menu when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new case
    Add {
        /// Case ID
        #[arg(allow_negative_numbers = true)]
        id: i64,

        /// Case description
        #[arg(long)]
        description: String,

        /// Priority (lower = more urgent)
        #[arg(long, allow_negative_numbers = true)]
        priority: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a case and its progress
    Delete {
        /// Case ID
        #[arg(allow_negative_numbers = true)]
        id: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace a case's description and priority
    Update {
        /// Case ID
        #[arg(allow_negative_numbers = true)]
        id: i64,

        /// New description
        #[arg(long)]
        description: String,

        /// New priority
        #[arg(long, allow_negative_numbers = true)]
        priority: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List cases by priority (most urgent first)
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List case ids in ascending order
    Ordered {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record or show workflow progress
    Progress {
        #[command(subcommand)]
        command: ProgressCommands,
    },

    /// Show the exported undo-log audit trail
    History {
        /// Undo-log JSONL path (overrides `undo_log_path` from config)
        #[arg(long)]
        undo_log: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the interactive numbered menu
    Menu,
}

#[derive(Subcommand)]
pub enum ProgressCommands {
    /// Append a stage to a case's progress
    Add {
        /// Case ID
        #[arg(allow_negative_numbers = true)]
        id: i64,

        /// Stage label or name (Registered, UnderInvestigation,
        /// HearingScheduled, JudgmentPassed, Closed) or free text
        stage: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a case's progress, oldest first
    Show {
        /// Case ID
        #[arg(allow_negative_numbers = true)]
        id: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
