//! Activity dashboard CLI library.
//!
//! This crate provides the CLI interface for the activity dashboard.

mod cli;
pub mod commands;
mod config;

pub use cli::{AttendanceArgs, CacheAction, Cli, Commands, ImportKind, ReportArgs};
pub use config::Config;
