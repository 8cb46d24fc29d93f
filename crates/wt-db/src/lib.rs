//! Storage layer for the activity dashboard.
//!
//! Persists usage events, attendance records, and the category cache using
//! `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but
//! not `Sync`. A `Database` instance can be moved between threads but cannot
//! be shared across threads without external synchronization.
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in ISO 8601 format (`2025-08-13T10:30:00`),
//! matching the capture layer's second-precision, timezone-naive convention.
//! Lexicographic ordering therefore matches chronological ordering, which
//! the trailing-window queries rely on.

use std::collections::HashMap;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use wt_core::{Assignment, AttendanceEvent, Category, ResolutionSource, UsageEvent};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for row {row_id}: {value}")]
    TimestampParse {
        row_id: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A cached category row holds a label outside the closed set.
    #[error("invalid cached category for {name}: {source}")]
    InvalidCategory {
        name: String,
        #[source]
        source: wt_core::UnknownCategory,
    },
}

/// A usage event row as stored, with its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRow {
    pub id: String,
    pub username: String,
    pub app_name: String,
    pub url: Option<String>,
    pub start_time: NaiveDateTime,
    pub duration_seconds: i64,
}

impl UsageRow {
    /// Converts into the core event type, dropping storage identity.
    #[must_use]
    pub fn into_event(self) -> UsageEvent {
        UsageEvent {
            app_name: self.app_name,
            url: self.url,
            start_time: self.start_time,
            duration_seconds: self.duration_seconds,
        }
    }
}

/// An attendance row as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRow {
    pub id: String,
    pub username: String,
    pub date: NaiveDate,
    pub arrival: NaiveDateTime,
    pub departure: NaiveDateTime,
}

impl AttendanceRow {
    /// Converts into the core event type, dropping storage identity.
    #[must_use]
    pub fn into_event(self) -> AttendanceEvent {
        AttendanceEvent {
            username: self.username,
            date: self.date,
            arrival: self.arrival,
            departure: self.departure,
        }
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection
    /// closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema. Idempotent.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS usage_events (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL,
                app_name TEXT NOT NULL,
                url TEXT,
                start_time TEXT NOT NULL,
                duration_seconds INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_usage_user ON usage_events(username);
            CREATE INDEX IF NOT EXISTS idx_usage_start ON usage_events(start_time);

            -- One clock-in/clock-out pair per user per calendar date
            CREATE TABLE IF NOT EXISTS attendance (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL,
                date TEXT NOT NULL,
                arrival TEXT NOT NULL,
                departure TEXT NOT NULL,
                UNIQUE (username, date)
            );

            CREATE INDEX IF NOT EXISTS idx_attendance_date ON attendance(date);

            CREATE TABLE IF NOT EXISTS category_cache (
                normalized_name TEXT PRIMARY KEY,
                category TEXT NOT NULL,
                source TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    // ── Usage events ───────────────────────────────────────────────────────

    /// Inserts a batch of usage rows, ignoring duplicates by ID.
    ///
    /// Returns the number of rows actually written.
    pub fn insert_usage_events(&mut self, rows: &[UsageRow]) -> Result<usize, DbError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT OR IGNORE INTO usage_events
                (id, username, app_name, url, start_time, duration_seconds)
                VALUES (?, ?, ?, ?, ?, ?)
                ",
            )?;
            for row in rows {
                inserted += stmt.execute(params![
                    row.id,
                    row.username,
                    row.app_name,
                    row.url,
                    row.start_time.format(TIMESTAMP_FORMAT).to_string(),
                    row.duration_seconds,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(inserted, "stored usage events");
        Ok(inserted)
    }

    /// All usage events for one user, oldest first.
    pub fn usage_events_for_user(&self, username: &str) -> Result<Vec<UsageEvent>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, username, app_name, url, start_time, duration_seconds
            FROM usage_events
            WHERE username = ?
            ORDER BY start_time ASC
            ",
        )?;
        let rows = stmt.query_map(params![username], usage_row_from_sql)?;
        collect_usage(rows)
    }

    /// Usage events for one user from `since` onward, oldest first.
    ///
    /// The bound is applied in SQL; ISO text ordering is chronological.
    pub fn usage_events_since(
        &self,
        username: &str,
        since: NaiveDateTime,
    ) -> Result<Vec<UsageEvent>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, username, app_name, url, start_time, duration_seconds
            FROM usage_events
            WHERE username = ? AND start_time >= ?
            ORDER BY start_time ASC
            ",
        )?;
        let rows = stmt.query_map(
            params![username, since.format(TIMESTAMP_FORMAT).to_string()],
            usage_row_from_sql,
        )?;
        collect_usage(rows)
    }

    /// All usage events grouped by username, oldest first within each user.
    pub fn usage_events_by_user(&self) -> Result<HashMap<String, Vec<UsageEvent>>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, username, app_name, url, start_time, duration_seconds
            FROM usage_events
            ORDER BY start_time ASC
            ",
        )?;
        let rows = stmt.query_map([], usage_row_from_sql)?;

        let mut by_user: HashMap<String, Vec<UsageEvent>> = HashMap::new();
        for row in rows {
            let row = parse_usage_row(row?)?;
            by_user
                .entry(row.username.clone())
                .or_default()
                .push(row.into_event());
        }
        Ok(by_user)
    }

    /// Number of stored usage events.
    pub fn usage_count(&self) -> Result<i64, DbError> {
        let count =
            self.conn
                .query_row("SELECT COUNT(*) FROM usage_events", [], |r| r.get(0))?;
        Ok(count)
    }

    // ── Attendance ─────────────────────────────────────────────────────────

    /// Inserts a batch of attendance rows.
    ///
    /// Duplicate IDs and duplicate `(username, date)` pairs are ignored;
    /// returns the number of rows actually written.
    pub fn insert_attendance(&mut self, rows: &[AttendanceRow]) -> Result<usize, DbError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT OR IGNORE INTO attendance
                (id, username, date, arrival, departure)
                VALUES (?, ?, ?, ?, ?)
                ",
            )?;
            for row in rows {
                inserted += stmt.execute(params![
                    row.id,
                    row.username,
                    row.date.format(DATE_FORMAT).to_string(),
                    row.arrival.format(TIMESTAMP_FORMAT).to_string(),
                    row.departure.format(TIMESTAMP_FORMAT).to_string(),
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(inserted, "stored attendance records");
        Ok(inserted)
    }

    /// All attendance records, oldest date first.
    pub fn attendance_all(&self) -> Result<Vec<AttendanceEvent>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, username, date, arrival, departure
            FROM attendance
            ORDER BY date ASC, username ASC
            ",
        )?;
        let rows = stmt.query_map([], attendance_row_from_sql)?;
        collect_attendance(rows)
    }

    /// Attendance records for one user, oldest date first.
    pub fn attendance_for_user(&self, username: &str) -> Result<Vec<AttendanceEvent>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, username, date, arrival, departure
            FROM attendance
            WHERE username = ?
            ORDER BY date ASC
            ",
        )?;
        let rows = stmt.query_map(params![username], attendance_row_from_sql)?;
        collect_attendance(rows)
    }

    /// Number of stored attendance records.
    pub fn attendance_count(&self) -> Result<i64, DbError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM attendance", [], |r| r.get(0))?;
        Ok(count)
    }

    // ── Category cache ─────────────────────────────────────────────────────

    /// Persists category assignments, replacing existing entries by name.
    pub fn save_cache(&mut self, entries: &[(String, Assignment)]) -> Result<(), DbError> {
        if entries.is_empty() {
            return Ok(());
        }
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "
                INSERT OR REPLACE INTO category_cache (normalized_name, category, source)
                VALUES (?, ?, ?)
                ",
            )?;
            for (name, assignment) in entries {
                stmt.execute(params![
                    name,
                    assignment.category.as_str(),
                    assignment.source.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Loads all persisted category assignments.
    ///
    /// Rows whose category label falls outside the closed set are an error:
    /// the cache is written by this crate only, so such a row means
    /// corruption rather than drift.
    pub fn load_cache(&self) -> Result<Vec<(String, Assignment)>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT normalized_name, category, source FROM category_cache")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (name, category, source) = row?;
            let category: Category =
                category
                    .parse()
                    .map_err(|source| DbError::InvalidCategory {
                        name: name.clone(),
                        source,
                    })?;
            let source: ResolutionSource =
                source.parse().map_err(|source| DbError::InvalidCategory {
                    name: name.clone(),
                    source,
                })?;
            entries.push((name, Assignment { category, source }));
        }
        Ok(entries)
    }

    /// Drops every persisted category assignment.
    ///
    /// Returns the number of entries removed. Safe at any time: a cleared
    /// cache simply re-derives assignments through the fallback chain.
    pub fn clear_cache(&mut self) -> Result<usize, DbError> {
        let removed = self.conn.execute("DELETE FROM category_cache", [])?;
        Ok(removed)
    }

    /// Number of persisted category assignments.
    pub fn cache_len(&self) -> Result<i64, DbError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM category_cache", [], |r| r.get(0))?;
        Ok(count)
    }

    /// Looks up one persisted assignment by normalized name.
    pub fn cached_assignment(&self, normalized_name: &str) -> Result<Option<Assignment>, DbError> {
        let row = self
            .conn
            .query_row(
                "SELECT category, source FROM category_cache WHERE normalized_name = ?",
                params![normalized_name],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((category, source)) => {
                let category: Category =
                    category
                        .parse()
                        .map_err(|source| DbError::InvalidCategory {
                            name: normalized_name.to_string(),
                            source,
                        })?;
                let source: ResolutionSource =
                    source.parse().map_err(|source| DbError::InvalidCategory {
                        name: normalized_name.to_string(),
                        source,
                    })?;
                Ok(Some(Assignment { category, source }))
            }
        }
    }
}

// ── Row parsing helpers ────────────────────────────────────────────────────

/// Intermediate row with timestamps still in text form.
type RawUsageRow = (String, String, String, Option<String>, String, i64);
type RawAttendanceRow = (String, String, String, String, String);

fn usage_row_from_sql(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUsageRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn attendance_row_from_sql(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAttendanceRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn parse_timestamp(row_id: &str, value: &str) -> Result<NaiveDateTime, DbError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|source| {
        DbError::TimestampParse {
            row_id: row_id.to_string(),
            value: value.to_string(),
            source,
        }
    })
}

fn parse_usage_row(raw: RawUsageRow) -> Result<UsageRow, DbError> {
    let (id, username, app_name, url, start_time, duration_seconds) = raw;
    let start_time = parse_timestamp(&id, &start_time)?;
    Ok(UsageRow {
        id,
        username,
        app_name,
        url,
        start_time,
        duration_seconds,
    })
}

fn parse_attendance_row(raw: RawAttendanceRow) -> Result<AttendanceRow, DbError> {
    let (id, username, date, arrival, departure) = raw;
    let parsed_date =
        NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|source| DbError::TimestampParse {
            row_id: id.clone(),
            value: date,
            source,
        })?;
    let arrival = parse_timestamp(&id, &arrival)?;
    let departure = parse_timestamp(&id, &departure)?;
    Ok(AttendanceRow {
        id,
        username,
        date: parsed_date,
        arrival,
        departure,
    })
}

fn collect_usage(
    rows: impl Iterator<Item = rusqlite::Result<RawUsageRow>>,
) -> Result<Vec<UsageEvent>, DbError> {
    let mut events = Vec::new();
    for row in rows {
        events.push(parse_usage_row(row?)?.into_event());
    }
    Ok(events)
}

fn collect_attendance(
    rows: impl Iterator<Item = rusqlite::Result<RawAttendanceRow>>,
) -> Result<Vec<AttendanceEvent>, DbError> {
    let mut events = Vec::new();
    for row in rows {
        events.push(parse_attendance_row(row?)?.into_event());
    }
    Ok(events)
}
