//! Usage aggregation: per-app, per-category, and per-day statistics.
//!
//! Everything here is recomputed from scratch on each call; there is no
//! incremental update model. Input events are expected to be cleaned
//! ([`crate::clean_events`]) and window-filtered by the caller.
//!
//! Grouping is order-preserving: the first time a key is seen fixes its
//! position, which makes tie-breaks ("first encountered wins") and top-N
//! ordering deterministic for identical inputs.

use std::collections::HashMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;

use crate::category::Category;
use crate::event::UsageEvent;
use crate::resolver::{Classify, Resolver};

/// Default length of top-N rankings.
pub const DEFAULT_TOP_N: usize = 10;

/// Totals for one per-app grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppUsage {
    /// `app_name`, or `"app_name - host"` for URL-bearing events. The same
    /// app name on different domains is tracked separately.
    pub key: String,
    pub total_seconds: i64,
    pub sessions: u64,
    pub average_session_seconds: i64,
}

/// Total time for one category. Present for all six categories, zeros
/// included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryUsage {
    pub category: Category,
    pub total_seconds: i64,
}

/// Total time for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayUsage {
    pub date: NaiveDate,
    pub total_seconds: i64,
}

/// Aggregated usage statistics for one event set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageSummary {
    pub total_seconds: i64,
    pub session_count: u64,
    pub average_session_seconds: i64,
    pub most_used_app: Option<String>,
    /// Per-app totals in encounter order.
    pub per_app: Vec<AppUsage>,
    /// All six categories in canonical order.
    pub per_category: Vec<CategoryUsage>,
    /// Per-date totals sorted ascending by date.
    pub per_day: Vec<DayUsage>,
}

impl UsageSummary {
    /// An all-zero summary, returned for empty input.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            total_seconds: 0,
            session_count: 0,
            average_session_seconds: 0,
            most_used_app: None,
            per_app: Vec::new(),
            per_category: Category::ALL
                .iter()
                .map(|&category| CategoryUsage {
                    category,
                    total_seconds: 0,
                })
                .collect(),
            per_day: Vec::new(),
        }
    }

    /// Top apps by descending total duration, truncated to `n`.
    /// Exact ties keep encounter order.
    #[must_use]
    pub fn top_apps(&self, n: usize) -> Vec<&AppUsage> {
        let mut ranked: Vec<&AppUsage> = self.per_app.iter().collect();
        // sort_by_key is stable, so ties preserve encounter order
        ranked.sort_by_key(|app| std::cmp::Reverse(app.total_seconds));
        ranked.truncate(n);
        ranked
    }

    /// Categories by descending total duration, truncated to `n`.
    /// Ties keep the canonical category order.
    #[must_use]
    pub fn top_categories(&self, n: usize) -> Vec<&CategoryUsage> {
        let mut ranked: Vec<&CategoryUsage> = self.per_category.iter().collect();
        ranked.sort_by_key(|c| std::cmp::Reverse(c.total_seconds));
        ranked.truncate(n);
        ranked
    }
}

/// Aggregates a cleaned, filtered event set into a [`UsageSummary`].
pub fn summarize<C: Classify>(events: &[UsageEvent], resolver: &Resolver<C>) -> UsageSummary {
    if events.is_empty() {
        return UsageSummary::empty();
    }

    // Per-app grouping, encounter order preserved via side index
    let mut app_order: Vec<String> = Vec::new();
    let mut app_index: HashMap<String, usize> = HashMap::new();
    let mut app_totals: Vec<(i64, u64)> = Vec::new(); // (seconds, sessions)

    let mut category_totals: HashMap<Category, i64> = HashMap::new();
    let mut day_totals: HashMap<NaiveDate, i64> = HashMap::new();

    let mut total_seconds = 0_i64;

    for event in events {
        let key = app_key(event);
        let idx = *app_index.entry(key.clone()).or_insert_with(|| {
            app_order.push(key);
            app_totals.push((0, 0));
            app_totals.len() - 1
        });
        app_totals[idx].0 += event.duration_seconds;
        app_totals[idx].1 += 1;

        let category = resolver.resolve(&event.app_name, event.url.as_deref());
        *category_totals.entry(category).or_insert(0) += event.duration_seconds;

        *day_totals.entry(event.start_time.date()).or_insert(0) += event.duration_seconds;

        total_seconds += event.duration_seconds;
    }

    let per_app: Vec<AppUsage> = app_order
        .into_iter()
        .zip(app_totals)
        .map(|(key, (seconds, sessions))| AppUsage {
            key,
            total_seconds: seconds,
            sessions,
            average_session_seconds: average(seconds, sessions),
        })
        .collect();

    let per_category: Vec<CategoryUsage> = Category::ALL
        .iter()
        .map(|&category| CategoryUsage {
            category,
            total_seconds: category_totals.get(&category).copied().unwrap_or(0),
        })
        .collect();

    let mut per_day: Vec<DayUsage> = day_totals
        .into_iter()
        .map(|(date, seconds)| DayUsage {
            date,
            total_seconds: seconds,
        })
        .collect();
    per_day.sort_by_key(|d| d.date);

    // Strictly-greatest total; first key encountered wins on ties
    let mut most_used_app: Option<&AppUsage> = None;
    for app in &per_app {
        if most_used_app.is_none_or(|best| app.total_seconds > best.total_seconds) {
            most_used_app = Some(app);
        }
    }
    let most_used_app = most_used_app.map(|app| app.key.clone());

    let session_count = events.len() as u64;

    UsageSummary {
        total_seconds,
        session_count,
        average_session_seconds: average(total_seconds, session_count),
        most_used_app,
        per_app,
        per_category,
        per_day,
    }
}

/// Sessions started on `today`, with their average length.
///
/// Returns `(session_count, average_session_seconds)`.
#[must_use]
pub fn sessions_today(events: &[UsageEvent], today: NaiveDate) -> (u64, i64) {
    let mut count = 0_u64;
    let mut seconds = 0_i64;
    for event in events {
        if event.start_time.date() == today {
            count += 1;
            seconds += event.duration_seconds;
        }
    }
    (count, average(seconds, count))
}

/// The `n` most recent events by start time, newest first.
#[must_use]
pub fn recent_sessions(events: &[UsageEvent], n: usize) -> Vec<&UsageEvent> {
    let mut sorted: Vec<&UsageEvent> = events.iter().collect();
    sorted.sort_by_key(|e| std::cmp::Reverse(e.start_time));
    sorted.truncate(n);
    sorted
}

/// Per-user summaries plus organization-wide totals.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationSummary {
    /// One summary per user, sorted by username.
    pub users: Vec<(String, UsageSummary)>,
    pub total_seconds: i64,
    pub session_count: u64,
}

/// Aggregates each user's events independently.
///
/// Users are independent, so their summaries are computed in parallel; the
/// shared resolver cache makes repeated app names across users cheap.
pub fn organization_summary<C: Classify>(
    events_by_user: &HashMap<String, Vec<UsageEvent>>,
    resolver: &Resolver<C>,
) -> OrganizationSummary {
    let mut users: Vec<(String, UsageSummary)> = events_by_user
        .par_iter()
        .map(|(username, events)| (username.clone(), summarize(events, resolver)))
        .collect();
    users.sort_by(|a, b| a.0.cmp(&b.0));

    let total_seconds = users.iter().map(|(_, s)| s.total_seconds).sum();
    let session_count = users.iter().map(|(_, s)| s.session_count).sum();

    OrganizationSummary {
        users,
        total_seconds,
        session_count,
    }
}

fn app_key(event: &UsageEvent) -> String {
    match event.url.as_deref().and_then(crate::resolver::host_of) {
        Some(host) => format!("{} - {}", event.app_name, host),
        None => event.app_name.clone(),
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn average(total_seconds: i64, sessions: u64) -> i64 {
    if sessions == 0 {
        0
    } else {
        (total_seconds as f64 / sessions as f64).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    fn at(day: u32, hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn event(app_name: &str, day: u32, hour: u32, duration_seconds: i64) -> UsageEvent {
        UsageEvent {
            app_name: app_name.to_string(),
            url: None,
            start_time: at(day, hour),
            duration_seconds,
        }
    }

    fn browser_event(
        app_name: &str,
        url: &str,
        day: u32,
        hour: u32,
        duration_seconds: i64,
    ) -> UsageEvent {
        UsageEvent {
            app_name: app_name.to_string(),
            url: Some(url.to_string()),
            start_time: at(day, hour),
            duration_seconds,
        }
    }

    fn category_total(summary: &UsageSummary, category: Category) -> i64 {
        summary
            .per_category
            .iter()
            .find(|c| c.category == category)
            .map_or(0, |c| c.total_seconds)
    }

    // Scenario A: one Chrome event, no URL
    #[test]
    fn single_chrome_event_lands_in_browsers() {
        let resolver = Resolver::offline();
        let events = vec![event("Google Chrome", 13, 10, 600)];
        let summary = summarize(&events, &resolver);

        assert_eq!(summary.total_seconds, 600);
        assert_eq!(category_total(&summary, Category::Browsers), 600);
        for category in Category::ALL {
            if category != Category::Browsers {
                assert_eq!(category_total(&summary, category), 0);
            }
        }
    }

    // Scenario D: vscode 500s over two sessions, youtube 400s
    #[test]
    fn most_used_app_and_category_split() {
        let resolver = Resolver::offline();
        let events = vec![
            event("vscode", 13, 9, 300),
            event("youtube", 13, 10, 400),
            event("vscode", 13, 11, 200),
        ];
        let summary = summarize(&events, &resolver);

        assert_eq!(summary.most_used_app.as_deref(), Some("vscode"));
        assert_eq!(category_total(&summary, Category::Work), 500);
        assert_eq!(category_total(&summary, Category::Entertainment), 400);
        assert_eq!(category_total(&summary, Category::Social), 0);

        let vscode = summary.per_app.iter().find(|a| a.key == "vscode").unwrap();
        assert_eq!(vscode.sessions, 2);
        assert_eq!(vscode.average_session_seconds, 250);
    }

    #[test]
    fn totals_are_conserved_across_groupings() {
        let resolver = Resolver::offline();
        let events = vec![
            event("vscode", 12, 9, 311),
            browser_event("Chrome", "https://youtube.com/w", 12, 10, 427),
            event("Slack", 13, 9, 93),
            event("unknown tool xyz", 13, 10, 55),
        ];
        let summary = summarize(&events, &resolver);

        let app_sum: i64 = summary.per_app.iter().map(|a| a.total_seconds).sum();
        let category_sum: i64 = summary.per_category.iter().map(|c| c.total_seconds).sum();
        let day_sum: i64 = summary.per_day.iter().map(|d| d.total_seconds).sum();

        assert_eq!(summary.total_seconds, 886);
        assert_eq!(app_sum, summary.total_seconds);
        assert_eq!(category_sum, summary.total_seconds);
        assert_eq!(day_sum, summary.total_seconds);
    }

    #[test]
    fn url_host_forms_composite_key() {
        let resolver = Resolver::offline();
        let events = vec![
            browser_event("Chrome", "https://youtube.com/w", 13, 9, 100),
            browser_event("Chrome", "https://docs.google.com/d", 13, 10, 200),
            event("Chrome", 13, 11, 50),
        ];
        let summary = summarize(&events, &resolver);

        let keys: Vec<_> = summary.per_app.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["Chrome - youtube.com", "Chrome - docs.google.com", "Chrome"]
        );
    }

    #[test]
    fn most_used_tie_break_is_first_encountered() {
        let resolver = Resolver::offline();
        let events = vec![
            event("alpha", 13, 9, 100),
            event("beta", 13, 10, 100),
        ];
        let summary = summarize(&events, &resolver);
        assert_eq!(summary.most_used_app.as_deref(), Some("alpha"));
    }

    #[test]
    fn empty_input_yields_zeroed_summary() {
        let resolver = Resolver::offline();
        let summary = summarize(&[], &resolver);

        assert_eq!(summary.total_seconds, 0);
        assert_eq!(summary.session_count, 0);
        assert_eq!(summary.average_session_seconds, 0);
        assert_eq!(summary.most_used_app, None);
        assert!(summary.per_app.is_empty());
        assert!(summary.per_day.is_empty());
        // All six categories still present, zeroed
        assert_eq!(summary.per_category.len(), 6);
        assert!(summary.per_category.iter().all(|c| c.total_seconds == 0));
    }

    #[test]
    fn per_day_sorted_ascending() {
        let resolver = Resolver::offline();
        let events = vec![
            event("a", 14, 9, 10),
            event("b", 12, 9, 20),
            event("c", 13, 9, 30),
        ];
        let summary = summarize(&events, &resolver);
        let dates: Vec<_> = summary.per_day.iter().map(|d| d.date.day()).collect();
        assert_eq!(dates, vec![12, 13, 14]);
    }

    #[test]
    fn top_apps_descending_with_stable_ties() {
        let resolver = Resolver::offline();
        let events = vec![
            event("small", 13, 8, 50),
            event("tie one", 13, 9, 100),
            event("tie two", 13, 10, 100),
            event("big", 13, 11, 300),
        ];
        let summary = summarize(&events, &resolver);

        let top: Vec<_> = summary
            .top_apps(3)
            .into_iter()
            .map(|a| a.key.as_str())
            .collect();
        assert_eq!(top, vec!["big", "tie one", "tie two"]);
    }

    #[test]
    fn top_categories_truncates() {
        let resolver = Resolver::offline();
        let events = vec![event("vscode", 13, 9, 100)];
        let summary = summarize(&events, &resolver);

        let top = summary.top_categories(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].category, Category::Work);
    }

    #[test]
    fn sessions_today_ignores_other_days() {
        let events = vec![
            event("a", 13, 9, 120),
            event("b", 13, 10, 60),
            event("c", 12, 9, 999),
        ];
        let today = NaiveDate::from_ymd_opt(2025, 8, 13).unwrap();
        let (count, avg) = sessions_today(&events, today);
        assert_eq!(count, 2);
        assert_eq!(avg, 90);
    }

    #[test]
    fn sessions_today_empty_is_zero() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 13).unwrap();
        assert_eq!(sessions_today(&[], today), (0, 0));
    }

    #[test]
    fn recent_sessions_newest_first() {
        let events = vec![
            event("a", 12, 9, 10),
            event("b", 13, 11, 10),
            event("c", 13, 9, 10),
        ];
        let recent: Vec<_> = recent_sessions(&events, 2)
            .into_iter()
            .map(|e| e.app_name.as_str())
            .collect();
        assert_eq!(recent, vec!["b", "c"]);
    }

    #[test]
    fn organization_summary_rolls_up_users() {
        let resolver = Resolver::offline();
        let mut by_user = HashMap::new();
        by_user.insert("amira".to_string(), vec![event("vscode", 13, 9, 300)]);
        by_user.insert(
            "badr".to_string(),
            vec![event("youtube", 13, 9, 100), event("Slack", 13, 10, 50)],
        );

        let org = organization_summary(&by_user, &resolver);
        assert_eq!(org.total_seconds, 450);
        assert_eq!(org.session_count, 3);
        let names: Vec<_> = org.users.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["amira", "badr"]);
    }
}
