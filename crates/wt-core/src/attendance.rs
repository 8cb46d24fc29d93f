//! Effective worked hours from clock-in/clock-out pairs.
//!
//! The calculator is pure and knows only times of day: arrivals and
//! departures are clamped to the work window, the break overlap is
//! subtracted, and the remainder is rounded to two decimals. Date grouping
//! for multi-day summaries belongs to the caller.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveTime;
use serde::Serialize;
use thiserror::Error;

use crate::event::AttendanceEvent;

/// Schedule configuration errors from [`WorkSchedule::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("work end must be after work start")]
    EndBeforeStart,
    #[error("break end must be after break start")]
    BreakEndBeforeStart,
    #[error("break must lie within the work window")]
    BreakOutsideWindow,
}

/// A fixed daily work schedule with one mandatory break.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorkSchedule {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub break_start: NaiveTime,
    pub break_end: NaiveTime,
    /// Hours required for a day to count as complete.
    pub full_day_hours: f64,
}

impl Default for WorkSchedule {
    /// 09:00–17:00 with a 12:00–13:00 break; 7 effective hours is a full day.
    fn default() -> Self {
        Self {
            start: hms(9, 0),
            end: hms(17, 0),
            break_start: hms(12, 0),
            break_end: hms(13, 0),
            full_day_hours: 7.0,
        }
    }
}

impl WorkSchedule {
    /// Checks the schedule for internal consistency.
    ///
    /// `effective_hours` never calls this: an invalid schedule still
    /// produces a numerically well-defined (if nonsensical) result, which
    /// is a caller-configuration error rather than a runtime fault.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.end <= self.start {
            return Err(ScheduleError::EndBeforeStart);
        }
        if self.break_end <= self.break_start {
            return Err(ScheduleError::BreakEndBeforeStart);
        }
        if self.break_start < self.start || self.break_end > self.end {
            return Err(ScheduleError::BreakOutsideWindow);
        }
        Ok(())
    }

    /// Clips a time of day to the work window, for display.
    ///
    /// An 08:30 arrival shows as 09:00; an 18:10 departure shows as 17:00.
    #[must_use]
    pub fn clamp_display_time(&self, time: NaiveTime) -> NaiveTime {
        time.clamp(self.start, self.end)
    }
}

/// Whether a day's effective hours reached the full-day threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttendanceStatus {
    Complete,
    Incomplete,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Complete => "Complete",
            Self::Incomplete => "Incomplete",
        };
        write!(f, "{s}")
    }
}

/// Break-excluded worked hours for one day, with the completeness verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectiveHours {
    /// Worked hours, rounded to two decimal places.
    pub hours: f64,
    pub status: AttendanceStatus,
}

impl EffectiveHours {
    const ZERO: Self = Self {
        hours: 0.0,
        status: AttendanceStatus::Incomplete,
    };
}

/// Computes effective worked hours for one arrival/departure pair.
///
/// Both bounds are clamped to the schedule's work window; any overlap with
/// the break is subtracted, capped at the nominal break length so a
/// misconfigured schedule cannot subtract more than the break itself.
#[must_use]
pub fn effective_hours(
    arrival: NaiveTime,
    departure: NaiveTime,
    schedule: &WorkSchedule,
) -> EffectiveHours {
    let effective_start = arrival.max(schedule.start);
    let effective_end = departure.min(schedule.end);

    // Absence, arrival after the window, or departure before it
    if effective_end <= effective_start {
        return EffectiveHours::ZERO;
    }

    let mut worked_seconds = (effective_end - effective_start).num_seconds();

    let overlap_start = effective_start.max(schedule.break_start);
    let overlap_end = effective_end.min(schedule.break_end);
    if overlap_end > overlap_start {
        let overlap = (overlap_end - overlap_start).num_seconds();
        let break_length = (schedule.break_end - schedule.break_start).num_seconds();
        worked_seconds -= overlap.min(break_length.max(0));
    }

    let hours = round2(seconds_to_hours(worked_seconds));
    let status = if hours >= schedule.full_day_hours {
        AttendanceStatus::Complete
    } else {
        AttendanceStatus::Incomplete
    };

    EffectiveHours { hours, status }
}

/// Effective hours for one attendance record, using its times of day.
#[must_use]
pub fn daily_effective_hours(event: &AttendanceEvent, schedule: &WorkSchedule) -> EffectiveHours {
    effective_hours(event.arrival.time(), event.departure.time(), schedule)
}

/// Per-user effective-hours totals in encounter order.
///
/// This is the organization rollup behind the attendance dashboard: each
/// record contributes its day's effective hours to its user's total.
#[must_use]
pub fn attendance_summary(
    events: &[AttendanceEvent],
    schedule: &WorkSchedule,
) -> Vec<(String, f64)> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, f64> = HashMap::new();

    for event in events {
        let hours = daily_effective_hours(event, schedule).hours;
        if !totals.contains_key(&event.username) {
            order.push(event.username.clone());
        }
        *totals.entry(event.username.clone()).or_insert(0.0) += hours;
    }

    order
        .into_iter()
        .map(|username| {
            let total = round2(totals[&username]);
            (username, total)
        })
        .collect()
}

/// Groups attendance records by username, encounter order preserved.
#[must_use]
pub fn group_by_user(events: &[AttendanceEvent]) -> Vec<(String, Vec<&AttendanceEvent>)> {
    group_by(events, |e| e.username.clone())
}

/// Groups attendance records by calendar date, encounter order preserved.
#[must_use]
pub fn group_by_date(events: &[AttendanceEvent]) -> Vec<(String, Vec<&AttendanceEvent>)> {
    group_by(events, |e| e.date.to_string())
}

fn group_by<F>(events: &[AttendanceEvent], key_fn: F) -> Vec<(String, Vec<&AttendanceEvent>)>
where
    F: Fn(&AttendanceEvent) -> String,
{
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&AttendanceEvent>> = HashMap::new();

    for event in events {
        let key = key_fn(event);
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(event);
    }

    order
        .into_iter()
        .map(|key| {
            let members = groups.remove(&key).unwrap_or_default();
            (key, members)
        })
        .collect()
}

fn hms(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

#[allow(clippy::cast_precision_loss)]
fn seconds_to_hours(seconds: i64) -> f64 {
    seconds as f64 / 3600.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn schedule() -> WorkSchedule {
        WorkSchedule::default()
    }

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn record(username: &str, day: u32, arrival: (u32, u32), departure: (u32, u32)) -> AttendanceEvent {
        let date = NaiveDate::from_ymd_opt(2025, 8, day).unwrap();
        AttendanceEvent {
            username: username.to_string(),
            date,
            arrival: date.and_hms_opt(arrival.0, arrival.1, 0).unwrap(),
            departure: date.and_hms_opt(departure.0, departure.1, 0).unwrap(),
        }
    }

    // Scenario B: early arrival, late departure clamp to the window
    #[test]
    fn full_day_clamps_and_excludes_break() {
        let result = effective_hours(t(8, 30), t(17, 30), &schedule());
        assert!((result.hours - 7.0).abs() < f64::EPSILON);
        assert_eq!(result.status, AttendanceStatus::Complete);
    }

    // Scenario C: presence entirely inside the break counts for nothing
    #[test]
    fn span_inside_break_is_zero() {
        let result = effective_hours(t(12, 15), t(12, 45), &schedule());
        assert!(result.hours.abs() < f64::EPSILON);
        assert_eq!(result.status, AttendanceStatus::Incomplete);
    }

    #[test]
    fn pair_entirely_outside_window_is_zero_incomplete() {
        // Before the window
        let before = effective_hours(t(6, 0), t(8, 0), &schedule());
        assert!(before.hours.abs() < f64::EPSILON);
        assert_eq!(before.status, AttendanceStatus::Incomplete);

        // After the window
        let after = effective_hours(t(18, 0), t(19, 30), &schedule());
        assert!(after.hours.abs() < f64::EPSILON);
        assert_eq!(after.status, AttendanceStatus::Incomplete);
    }

    #[test]
    fn departure_before_arrival_is_zero() {
        let result = effective_hours(t(15, 0), t(10, 0), &schedule());
        assert!(result.hours.abs() < f64::EPSILON);
        assert_eq!(result.status, AttendanceStatus::Incomplete);
    }

    #[test]
    fn partial_overlap_with_break() {
        // 09:00 to 12:30: 3.5h raw, 0.5h of break overlap
        let result = effective_hours(t(9, 0), t(12, 30), &schedule());
        assert!((result.hours - 3.0).abs() < f64::EPSILON);
        assert_eq!(result.status, AttendanceStatus::Incomplete);
    }

    #[test]
    fn short_day_is_incomplete() {
        // 10:00 to 16:00 minus 1h break = 5h
        let result = effective_hours(t(10, 0), t(16, 0), &schedule());
        assert!((result.hours - 5.0).abs() < f64::EPSILON);
        assert_eq!(result.status, AttendanceStatus::Incomplete);
    }

    #[test]
    fn rounding_is_two_decimals() {
        // 09:00 to 09:10 = 600s = 0.166..h -> 0.17
        let result = effective_hours(t(9, 0), t(9, 10), &schedule());
        assert!((result.hours - 0.17).abs() < f64::EPSILON);
    }

    #[test]
    fn threshold_is_configurable() {
        let lenient = WorkSchedule {
            full_day_hours: 4.0,
            ..schedule()
        };
        let result = effective_hours(t(10, 0), t(16, 0), &lenient);
        assert_eq!(result.status, AttendanceStatus::Complete);
    }

    #[test]
    fn break_subtraction_capped_at_nominal_length() {
        // Misconfigured: break "ends" at 16:00, nominally 12:00-16:00 = 4h.
        // Overlap computation can never subtract more than that nominal
        // length even if clamping produced a larger overlap figure.
        let odd = WorkSchedule {
            break_start: t(12, 0),
            break_end: t(16, 0),
            ..schedule()
        };
        let result = effective_hours(t(9, 0), t(17, 0), &odd);
        // 8h window minus 4h break
        assert!((result.hours - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_flags_bad_schedules() {
        assert!(schedule().validate().is_ok());

        let backwards = WorkSchedule {
            start: t(17, 0),
            end: t(9, 0),
            ..schedule()
        };
        assert_eq!(backwards.validate(), Err(ScheduleError::EndBeforeStart));

        let inverted_break = WorkSchedule {
            break_start: t(13, 0),
            break_end: t(12, 0),
            ..schedule()
        };
        assert_eq!(
            inverted_break.validate(),
            Err(ScheduleError::BreakEndBeforeStart)
        );

        let stray_break = WorkSchedule {
            break_start: t(8, 0),
            break_end: t(9, 30),
            ..schedule()
        };
        assert_eq!(stray_break.validate(), Err(ScheduleError::BreakOutsideWindow));
    }

    #[test]
    fn display_times_are_clipped_to_window() {
        let s = schedule();
        assert_eq!(s.clamp_display_time(t(8, 30)), t(9, 0));
        assert_eq!(s.clamp_display_time(t(18, 10)), t(17, 0));
        assert_eq!(s.clamp_display_time(t(10, 45)), t(10, 45));
    }

    #[test]
    fn summary_totals_per_user_in_encounter_order() {
        let events = vec![
            record("amira", 11, (9, 0), (17, 0)),  // 7.00
            record("badr", 11, (10, 0), (16, 0)),  // 5.00
            record("amira", 12, (9, 0), (12, 30)), // 3.00
        ];
        let summary = attendance_summary(&events, &schedule());
        assert_eq!(
            summary,
            vec![("amira".to_string(), 10.0), ("badr".to_string(), 5.0)]
        );
    }

    #[test]
    fn grouping_views() {
        let events = vec![
            record("amira", 11, (9, 0), (17, 0)),
            record("badr", 11, (9, 0), (17, 0)),
            record("amira", 12, (9, 0), (17, 0)),
        ];

        let by_user = group_by_user(&events);
        assert_eq!(by_user.len(), 2);
        assert_eq!(by_user[0].0, "amira");
        assert_eq!(by_user[0].1.len(), 2);

        let by_date = group_by_date(&events);
        assert_eq!(by_date.len(), 2);
        assert_eq!(by_date[0].0, "2025-08-11");
        assert_eq!(by_date[0].1.len(), 2);
    }

    #[test]
    fn daily_effective_hours_uses_times_of_day() {
        let entry = record("amira", 13, (8, 30), (17, 30));
        let result = daily_effective_hours(&entry, &schedule());
        assert!((result.hours - 7.0).abs() < f64::EPSILON);
        assert_eq!(result.status, AttendanceStatus::Complete);
    }
}
