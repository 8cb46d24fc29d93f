//! Attendance report command.
//!
//! Lists each day's effective worked hours, with arrival and departure
//! clipped to the schedule window for display. Grouped by user with
//! per-user totals, or by calendar date with `--by-date`.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;

use wt_core::{
    AttendanceEvent, WorkSchedule, daily_effective_hours, filter_trailing_owned, group_by_date,
    group_by_user,
};
use wt_db::Database;

/// Attendance report parameters.
#[derive(Debug, Clone, Copy)]
pub struct AttendanceOptions<'a> {
    /// Single user to report on; `None` includes everyone.
    pub user: Option<&'a str>,
    /// Trailing window length in days; `None` keeps all records.
    pub days: Option<f64>,
    /// Group output by calendar date instead of by user.
    pub by_date: bool,
    /// Emit JSON instead of the human-readable report.
    pub json: bool,
    /// End of the reporting window.
    pub now: NaiveDateTime,
}

#[derive(Debug, Serialize)]
struct DayReport<'a> {
    username: &'a str,
    date: String,
    arrival: String,
    departure: String,
    hours: f64,
    status: String,
}

#[derive(Debug, Serialize)]
struct AttendanceReport<'a> {
    days: Vec<DayReport<'a>>,
    totals: Vec<UserTotal>,
}

#[derive(Debug, Serialize)]
struct UserTotal {
    username: String,
    total_hours: f64,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    schedule: &WorkSchedule,
    opts: &AttendanceOptions<'_>,
) -> Result<()> {
    let mut records = match opts.user {
        Some(user) => db.attendance_for_user(user)?,
        None => db.attendance_all()?,
    };
    if let Some(days) = opts.days {
        records = filter_trailing_owned(&records, days, opts.now);
    }

    if opts.json {
        let report = build_report(&records, schedule);
        serde_json::to_writer_pretty(&mut *writer, &report)?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(writer, "Attendance report")?;
    if records.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "No attendance records.")?;
        return Ok(());
    }

    if opts.by_date {
        render_by_date(writer, &records, schedule)?;
    } else {
        render_by_user(writer, &records, schedule)?;
    }

    Ok(())
}

fn render_by_user<W: Write>(
    writer: &mut W,
    records: &[AttendanceEvent],
    schedule: &WorkSchedule,
) -> Result<()> {
    for (username, days) in group_by_user(records) {
        writeln!(writer)?;
        writeln!(writer, "{username}")?;
        let mut total = 0.0;
        for record in days {
            let effective = daily_effective_hours(record, schedule);
            total += effective.hours;
            writeln!(
                writer,
                "  {}  {}  {:.2}h  {}",
                record.date,
                display_span(record, schedule),
                effective.hours,
                effective.status,
            )?;
        }
        writeln!(writer, "  Total: {total:.2}h")?;
    }
    Ok(())
}

fn render_by_date<W: Write>(
    writer: &mut W,
    records: &[AttendanceEvent],
    schedule: &WorkSchedule,
) -> Result<()> {
    for (date, days) in group_by_date(records) {
        writeln!(writer)?;
        writeln!(writer, "{date}")?;
        for record in days {
            let effective = daily_effective_hours(record, schedule);
            writeln!(
                writer,
                "  {}  {}  {:.2}h  {}",
                record.username,
                display_span(record, schedule),
                effective.hours,
                effective.status,
            )?;
        }
    }
    Ok(())
}

fn display_span(record: &AttendanceEvent, schedule: &WorkSchedule) -> String {
    format!(
        "{}-{}",
        schedule
            .clamp_display_time(record.arrival.time())
            .format("%H:%M"),
        schedule
            .clamp_display_time(record.departure.time())
            .format("%H:%M"),
    )
}

fn build_report<'a>(
    records: &'a [AttendanceEvent],
    schedule: &WorkSchedule,
) -> AttendanceReport<'a> {
    let mut days = Vec::new();
    let mut totals = Vec::new();

    for (username, user_days) in group_by_user(records) {
        let mut total = 0.0;
        for record in user_days {
            let effective = daily_effective_hours(record, schedule);
            total += effective.hours;
            days.push(DayReport {
                username: &record.username,
                date: record.date.to_string(),
                arrival: schedule
                    .clamp_display_time(record.arrival.time())
                    .format("%H:%M")
                    .to_string(),
                departure: schedule
                    .clamp_display_time(record.departure.time())
                    .format("%H:%M")
                    .to_string(),
                hours: effective.hours,
                status: effective.status.to_string(),
            });
        }
        totals.push(UserTotal {
            username,
            total_hours: (total * 100.0).round() / 100.0,
        });
    }

    AttendanceReport { days, totals }
}
