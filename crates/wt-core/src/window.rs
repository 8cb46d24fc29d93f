//! Trailing-window event filtering.

use chrono::{Duration, NaiveDateTime};

use crate::event::Timestamped;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Keeps events whose timestamp falls within the trailing window
/// `[now - window_days * 86400s, now]`, preserving input order.
///
/// `window_days` may be fractional (a "last 24h" view is `1.0`). A zero or
/// negative window yields an empty result rather than an error.
pub fn filter_trailing<'a, T: Timestamped>(
    events: &'a [T],
    window_days: f64,
    now: NaiveDateTime,
) -> Vec<&'a T> {
    let Some(start) = window_start(window_days, now) else {
        return Vec::new();
    };
    events
        .iter()
        .filter(|e| {
            let t = e.timestamp();
            t >= start && t <= now
        })
        .collect()
}

/// Owned-value variant of [`filter_trailing`].
#[must_use]
pub fn filter_trailing_owned<T: Timestamped + Clone>(
    events: &[T],
    window_days: f64,
    now: NaiveDateTime,
) -> Vec<T> {
    filter_trailing(events, window_days, now)
        .into_iter()
        .cloned()
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn window_start(window_days: f64, now: NaiveDateTime) -> Option<NaiveDateTime> {
    if window_days.is_nan() || window_days <= 0.0 {
        return None;
    }
    // The cast saturates for huge windows; a span too large to represent
    // or to subtract reaches all of the past, so the start clamps to the
    // earliest representable instant.
    let span_seconds = (window_days * SECONDS_PER_DAY).round() as i64;
    let start = Duration::try_seconds(span_seconds)
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(NaiveDateTime::MIN);
    Some(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::UsageEvent;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn event_at(app_name: &str, start_time: NaiveDateTime) -> UsageEvent {
        UsageEvent {
            app_name: app_name.to_string(),
            url: None,
            start_time,
            duration_seconds: 60,
        }
    }

    #[test]
    fn keeps_events_inside_window() {
        let events = vec![
            event_at("old", at(1, 9)),
            event_at("recent", at(12, 9)),
            event_at("today", at(13, 8)),
        ];
        let kept = filter_trailing(&events, 7.0, at(13, 12));
        let names: Vec<_> = kept.iter().map(|e| e.app_name.as_str()).collect();
        assert_eq!(names, vec!["recent", "today"]);
    }

    #[test]
    fn preserves_input_order() {
        let events = vec![
            event_at("b", at(12, 10)),
            event_at("a", at(12, 9)),
            event_at("c", at(12, 11)),
        ];
        let kept = filter_trailing(&events, 7.0, at(13, 12));
        let names: Vec<_> = kept.iter().map(|e| e.app_name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn boundaries_are_inclusive() {
        let now = at(13, 12);
        let exactly_one_day_ago = at(12, 12);
        let events = vec![event_at("edge", exactly_one_day_ago), event_at("now", now)];
        let kept = filter_trailing(&events, 1.0, now);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn future_events_are_excluded() {
        let events = vec![event_at("future", at(14, 9))];
        let kept = filter_trailing(&events, 7.0, at(13, 12));
        assert!(kept.is_empty());
    }

    #[test]
    fn zero_window_yields_empty() {
        let events = vec![event_at("x", at(13, 12))];
        assert!(filter_trailing(&events, 0.0, at(13, 12)).is_empty());
    }

    #[test]
    fn negative_window_yields_empty() {
        let events = vec![event_at("x", at(13, 12))];
        assert!(filter_trailing(&events, -3.0, at(13, 12)).is_empty());
        assert!(filter_trailing(&events, f64::NAN, at(13, 12)).is_empty());
    }

    #[test]
    fn huge_window_keeps_all_past_events() {
        let now = at(13, 12);
        let events = vec![
            event_at("ancient", NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()),
            event_at("current", now),
        ];
        for window_days in [1e30, f64::INFINITY, f64::from(i32::MAX)] {
            let kept = filter_trailing(&events, window_days, now);
            assert_eq!(kept.len(), 2, "window of {window_days} days dropped events");
        }
    }

    #[test]
    fn fractional_day_window() {
        let now = at(13, 12);
        let events = vec![
            event_at("in", at(13, 1)),   // 11h ago
            event_at("out", at(12, 23)), // 13h ago
        ];
        let kept = filter_trailing(&events, 0.5, now);
        let names: Vec<_> = kept.iter().map(|e| e.app_name.as_str()).collect();
        assert_eq!(names, vec!["in"]);
    }

    #[test]
    fn owned_variant_clones_values() {
        let events = vec![event_at("x", at(13, 11))];
        let kept = filter_trailing_owned(&events, 1.0, at(13, 12));
        assert_eq!(kept, events);
    }
}
