//! Usage report command.
//!
//! Reports cover a trailing window ending now: per-app totals, all six
//! category totals, and per-day totals, for one user or rolled up across
//! the organization.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;

use wt_core::{
    Classify, OrganizationSummary, Resolver, UsageSummary, clean_events, filter_trailing_owned,
    organization_summary, summarize,
};
use wt_db::Database;

use super::format_duration;

/// Report parameters, resolved from CLI arguments and config.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions<'a> {
    /// Single user to report on; `None` rolls up the whole organization.
    pub user: Option<&'a str>,
    /// Trailing window length in days.
    pub days: f64,
    /// How many top apps to list.
    pub top_n: usize,
    /// Emit JSON instead of the human-readable report.
    pub json: bool,
    /// End of the reporting window.
    pub now: NaiveDateTime,
}

#[derive(Debug, Serialize)]
struct UserReport<'a> {
    user: &'a str,
    window_days: f64,
    summary: &'a UsageSummary,
}

#[derive(Debug, Serialize)]
struct OrgReport<'a> {
    window_days: f64,
    summary: &'a OrganizationSummary,
}

pub fn run<W: Write, C: Classify>(
    writer: &mut W,
    db: &Database,
    resolver: &Resolver<C>,
    opts: &ReportOptions<'_>,
) -> Result<()> {
    if let Some(user) = opts.user {
        let events = clean_events(db.usage_events_for_user(user)?);
        let events = filter_trailing_owned(&events, opts.days, opts.now);
        let summary = summarize(&events, resolver);

        if opts.json {
            serde_json::to_writer_pretty(
                &mut *writer,
                &UserReport {
                    user,
                    window_days: opts.days,
                    summary: &summary,
                },
            )?;
            writeln!(writer)?;
        } else {
            render_user(writer, user, &summary, opts)?;
        }
    } else {
        let mut by_user = db.usage_events_by_user()?;
        for events in by_user.values_mut() {
            let cleaned = clean_events(std::mem::take(events));
            *events = filter_trailing_owned(&cleaned, opts.days, opts.now);
        }
        let summary = organization_summary(&by_user, resolver);

        if opts.json {
            serde_json::to_writer_pretty(
                &mut *writer,
                &OrgReport {
                    window_days: opts.days,
                    summary: &summary,
                },
            )?;
            writeln!(writer)?;
        } else {
            render_org(writer, &summary, opts)?;
        }
    }
    Ok(())
}

fn render_user<W: Write>(
    writer: &mut W,
    user: &str,
    summary: &UsageSummary,
    opts: &ReportOptions<'_>,
) -> Result<()> {
    writeln!(writer, "Usage report for {user} (last {} days)", opts.days)?;
    writeln!(writer)?;
    writeln!(
        writer,
        "Total: {} across {} {} (avg {})",
        format_duration(summary.total_seconds),
        summary.session_count,
        plural(summary.session_count),
        format_duration(summary.average_session_seconds),
    )?;
    if let Some(app) = &summary.most_used_app {
        writeln!(writer, "Most used: {app}")?;
    }

    if summary.session_count == 0 {
        writeln!(writer)?;
        writeln!(writer, "No activity in this window.")?;
        return Ok(());
    }

    writeln!(writer)?;
    writeln!(writer, "Top apps:")?;
    for app in summary.top_apps(opts.top_n) {
        writeln!(
            writer,
            "  {}: {} ({} {})",
            app.key,
            format_duration(app.total_seconds),
            app.sessions,
            plural(app.sessions),
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "Categories:")?;
    for category in &summary.per_category {
        writeln!(
            writer,
            "  {}: {}",
            category.category,
            format_duration(category.total_seconds),
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "Daily:")?;
    for day in &summary.per_day {
        writeln!(
            writer,
            "  {}: {}",
            day.date,
            format_duration(day.total_seconds),
        )?;
    }

    Ok(())
}

fn render_org<W: Write>(
    writer: &mut W,
    summary: &OrganizationSummary,
    opts: &ReportOptions<'_>,
) -> Result<()> {
    writeln!(writer, "Organization usage report (last {} days)", opts.days)?;
    writeln!(writer)?;
    writeln!(
        writer,
        "Total: {} across {} {}",
        format_duration(summary.total_seconds),
        summary.session_count,
        plural(summary.session_count),
    )?;

    if summary.users.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "No activity in this window.")?;
        return Ok(());
    }

    writeln!(writer)?;
    for (username, user_summary) in &summary.users {
        match &user_summary.most_used_app {
            Some(app) => writeln!(
                writer,
                "{username}: {} ({} {}), most used {app}",
                format_duration(user_summary.total_seconds),
                user_summary.session_count,
                plural(user_summary.session_count),
            )?,
            None => writeln!(
                writer,
                "{username}: {} ({} {})",
                format_duration(user_summary.total_seconds),
                user_summary.session_count,
                plural(user_summary.session_count),
            )?,
        }
    }

    Ok(())
}

const fn plural(count: u64) -> &'static str {
    if count == 1 { "session" } else { "sessions" }
}
