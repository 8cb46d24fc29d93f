//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Activity dashboard.
///
/// Stores application usage and attendance records and reports on them:
/// per-app, per-category, and per-day usage plus effective worked hours.
#[derive(Debug, Parser)]
#[command(name = "wt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import records from JSON Lines.
    Import {
        #[command(subcommand)]
        kind: ImportKind,
    },

    /// Usage report for one user or the whole organization.
    Report(ReportArgs),

    /// Attendance report with effective worked hours.
    Attendance(AttendanceArgs),

    /// Resolve one application name to a category.
    Categorize {
        /// Application or window name.
        name: String,

        /// Source URL, for browser windows.
        #[arg(long)]
        url: Option<String>,
    },

    /// Inspect or clear the persisted category cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show database contents at a glance.
    Status,
}

/// Record kinds that can be imported.
#[derive(Debug, Subcommand)]
pub enum ImportKind {
    /// Usage events: one JSON object per line with `app_name`,
    /// `start_time`, `duration_seconds`, and optional `url`.
    Usage {
        /// Input file; reads stdin when omitted.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Default username for records that omit `username`.
        #[arg(long)]
        username: Option<String>,
    },

    /// Attendance records: one JSON object per line with `username`,
    /// `date`, `arrival`, and `departure`.
    Attendance {
        /// Input file; reads stdin when omitted.
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

/// Arguments for the usage report.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Report a single user; omit for the organization rollup.
    #[arg(long)]
    pub user: Option<String>,

    /// Trailing window length in days. Fractions are allowed.
    #[arg(long, default_value_t = 7.0)]
    pub days: f64,

    /// Number of top apps to list; defaults to the configured value.
    #[arg(long)]
    pub top: Option<usize>,

    /// Emit JSON instead of the human-readable report.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the attendance report.
#[derive(Debug, Args)]
pub struct AttendanceArgs {
    /// Report a single user; omit for all users.
    #[arg(long)]
    pub user: Option<String>,

    /// Trailing window length in days; omit for all records.
    #[arg(long)]
    pub days: Option<f64>,

    /// Group the report by calendar date instead of by user.
    #[arg(long)]
    pub by_date: bool,

    /// Emit JSON instead of the human-readable report.
    #[arg(long)]
    pub json: bool,
}

/// Cache maintenance actions.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// List persisted category assignments.
    Show,

    /// Drop every persisted assignment. Categories are re-derived on the
    /// next report.
    Clear,
}
