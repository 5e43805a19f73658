//! Command-line interface definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Issue and BPMN process board
///
/// Loads a board snapshot (JSON), recomputes element statuses from linked
/// issues, and prints statuses, backlogs, links and consistency reports.
///
/// Exit Codes:
///   0  - Command succeeded
///   1  - Generic error occurred
///   2  - Invalid arguments or usage error
///   3  - Resource not found (snapshot, issue, diagram, project)
///   4  - Validation failed (dangling links, bad snapshot)
///  10  - File system failure
#[derive(Parser)]
#[command(name = "flowboard")]
#[command(about = "Issue and BPMN process board", long_about = None)]
pub struct Cli {
    /// Config file (default: flowboard.toml next to the snapshot)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output (for scripting)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show element statuses, optionally for one diagram
    Status {
        /// Snapshot file
        snapshot: PathBuf,

        /// Restrict output to this diagram
        #[arg(long)]
        diagram: Option<String>,
    },

    /// List a project's issues that are not in any sprint
    Backlog {
        snapshot: PathBuf,

        #[arg(long)]
        project: String,

        /// Only issues assigned to this user
        #[arg(long)]
        assignee: Option<String>,

        /// Only issues in this status (to_do, in_progress, done)
        #[arg(long)]
        status: Option<String>,
    },

    /// List the diagram elements an issue is linked to
    Links {
        snapshot: PathBuf,

        #[arg(long)]
        issue: String,
    },

    /// Report links whose issue or element no longer exists
    Check { snapshot: PathBuf },
}

impl Commands {
    pub fn snapshot(&self) -> &PathBuf {
        match self {
            Commands::Status { snapshot, .. }
            | Commands::Backlog { snapshot, .. }
            | Commands::Links { snapshot, .. }
            | Commands::Check { snapshot } => snapshot,
        }
    }

    /// Name used in JSON metadata
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Status { .. } => "status",
            Commands::Backlog { .. } => "backlog",
            Commands::Links { .. } => "links",
            Commands::Check { .. } => "check",
        }
    }
}
