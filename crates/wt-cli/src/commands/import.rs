//! Import command for loading records into the local `SQLite` store.
//!
//! Input is JSON Lines: one record per line, blank lines skipped. Row IDs
//! are generated at import time, so re-importing the same file inserts
//! duplicates; attendance is protected by its per-user-per-date uniqueness
//! instead.

use std::io::BufRead;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use uuid::Uuid;

use wt_db::{AttendanceRow, Database, UsageRow};

/// Imports usage events, returning the number of rows written.
pub fn run_usage<R: BufRead>(
    db: &mut Database,
    reader: R,
    default_username: Option<&str>,
) -> Result<usize> {
    let rows = parse_usage(reader, default_username)?;
    let inserted = db.insert_usage_events(&rows)?;
    tracing::info!(parsed = rows.len(), inserted, "imported usage events");
    Ok(inserted)
}

/// Imports attendance records, returning the number of rows written.
///
/// Records for an already-stored `(username, date)` pair are skipped.
pub fn run_attendance<R: BufRead>(db: &mut Database, reader: R) -> Result<usize> {
    let rows = parse_attendance(reader)?;
    let inserted = db.insert_attendance(&rows)?;
    tracing::info!(parsed = rows.len(), inserted, "imported attendance records");
    Ok(inserted)
}

fn parse_usage<R: BufRead>(reader: R, default_username: Option<&str>) -> Result<Vec<UsageRow>> {
    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parsed: UsageRecord = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON on line {}", idx + 1))?;
        let row = parsed
            .into_row(default_username)
            .with_context(|| format!("invalid record on line {}", idx + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

fn parse_attendance<R: BufRead>(reader: R) -> Result<Vec<AttendanceRow>> {
    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parsed: AttendanceRecord = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON on line {}", idx + 1))?;
        rows.push(parsed.into_row());
    }
    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct UsageRecord {
    #[serde(default)]
    username: Option<String>,
    app_name: String,
    #[serde(default)]
    url: Option<String>,
    start_time: NaiveDateTime,
    duration_seconds: i64,
}

impl UsageRecord {
    fn into_row(self, default_username: Option<&str>) -> Result<UsageRow> {
        let username = match self.username {
            Some(username) if !username.trim().is_empty() => username,
            _ => default_username
                .map(str::to_string)
                .filter(|val| !val.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("missing username"))?,
        };
        Ok(UsageRow {
            id: Uuid::new_v4().to_string(),
            username,
            app_name: self.app_name,
            url: self.url,
            start_time: self.start_time,
            duration_seconds: self.duration_seconds,
        })
    }
}

#[derive(Debug, Deserialize)]
struct AttendanceRecord {
    username: String,
    date: NaiveDate,
    arrival: NaiveDateTime,
    departure: NaiveDateTime,
}

impl AttendanceRecord {
    fn into_row(self) -> AttendanceRow {
        AttendanceRow {
            id: Uuid::new_v4().to_string(),
            username: self.username,
            date: self.date,
            arrival: self.arrival,
            departure: self.departure,
        }
    }
}
