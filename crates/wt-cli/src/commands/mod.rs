//! CLI subcommand implementations.

pub mod attendance;
pub mod cache;
pub mod categorize;
pub mod import;
pub mod report;
pub mod status;

/// Formats a duration in seconds for report output.
///
/// Returns `"Xh Ym Zs"` for an hour or more, `"Xm Ys"` for a minute or
/// more, `"Xs"` otherwise. Negative durations render as `"0s"`.
#[must_use]
pub fn format_duration(seconds: i64) -> String {
    if seconds < 0 {
        return "0s".to_string();
    }
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
