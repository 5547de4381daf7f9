// src/cli/mod.rs — CLI definition (clap derive)

pub mod daemon;
pub mod history;
pub mod predictions;
pub mod run;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cleanrec",
    about = "Weekly cleaning recommendations from robot vacuum history",
    version
)]
pub struct Cli {
    /// Config file path
    #[arg(long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the recommendation job once
    Run {
        /// Idempotency key for the batch (defaults to the current weekly slot)
        #[arg(long)]
        run_key: Option<String>,
        /// Write a new batch even if this week's batch exists
        #[arg(long, conflicts_with = "run_key")]
        force: bool,
        /// Also print per-mode care averages
        #[arg(short, long)]
        verbose: bool,
    },
    /// Import or add cleaning history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Show the most recently stored recommendations
    Predictions {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Background scheduler for the weekly run
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
    /// Show configuration, storage and daemon status
    Status,
}

#[derive(Subcommand, Clone)]
pub enum HistoryAction {
    /// Import a JSON array of history records
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Record a single cleaning session
    Add {
        /// Mode label, e.g. "습식 모드"
        #[arg(long)]
        mode: String,
        /// Session start (RFC 3339)
        #[arg(long)]
        start: String,
        #[arg(long)]
        crumb: bool,
        #[arg(long)]
        grease: bool,
        #[arg(long)]
        water: bool,
    },
}

#[derive(Subcommand, Clone)]
pub enum DaemonAction {
    /// Start the scheduler in the foreground
    Start,
    /// Stop the running daemon
    Stop,
    /// Show daemon status
    Status,
}
