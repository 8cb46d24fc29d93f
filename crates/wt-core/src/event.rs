//! Raw event records as supplied by the capture collaborator.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Sentinel app names produced by the capture layer when it could not
/// identify the focused window. Excluded before any aggregation.
const UNKNOWN_SENTINELS: &[&str] = &["unknown", "unrecognized application"];

/// One observed focus/usage interval.
///
/// Events are immutable once received; the engine never mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    /// Raw, uncleaned application or window label.
    pub app_name: String,

    /// Source URL, present only for browser-sourced events.
    #[serde(default)]
    pub url: Option<String>,

    /// Timezone-naive start of the interval, second precision.
    pub start_time: NaiveDateTime,

    /// Interval length in seconds.
    pub duration_seconds: i64,
}

impl UsageEvent {
    /// Returns true if the app name is the capture layer's unknown-window
    /// sentinel (case-insensitive).
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        let name = self.app_name.trim().to_ascii_lowercase();
        UNKNOWN_SENTINELS.contains(&name.as_str())
    }

    /// Returns true for records that cannot be aggregated: empty name or
    /// negative duration.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        self.app_name.trim().is_empty() || self.duration_seconds < 0
    }
}

/// One clock-in/clock-out pair for one user on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    pub username: String,
    pub date: NaiveDate,
    pub arrival: NaiveDateTime,
    pub departure: NaiveDateTime,
}

/// An event with a single representative timestamp, usable with the
/// trailing-window filter.
pub trait Timestamped {
    fn timestamp(&self) -> NaiveDateTime;
}

impl Timestamped for UsageEvent {
    fn timestamp(&self) -> NaiveDateTime {
        self.start_time
    }
}

impl Timestamped for AttendanceEvent {
    fn timestamp(&self) -> NaiveDateTime {
        self.arrival
    }
}

/// Drops sentinel and malformed usage events, preserving input order.
///
/// Callers run this before handing events to the aggregation engine; the
/// engine itself assumes clean input.
#[must_use]
pub fn clean_events(events: Vec<UsageEvent>) -> Vec<UsageEvent> {
    let before = events.len();
    let cleaned: Vec<UsageEvent> = events
        .into_iter()
        .filter(|e| !e.is_unknown() && !e.is_malformed())
        .collect();
    let dropped = before - cleaned.len();
    if dropped > 0 {
        tracing::debug!(dropped, "excluded sentinel or malformed usage events");
    }
    cleaned
}
