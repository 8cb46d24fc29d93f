//! Core analytics for the activity dashboard.
//!
//! This crate contains the pure computation layer:
//! - Categorization: resolving app/window names to semantic categories
//!   through a layered fallback chain with memoization
//! - Aggregation: per-app, per-category, and per-day usage statistics
//! - Attendance: effective worked hours against a fixed schedule

pub mod aggregate;
pub mod attendance;
pub mod category;
mod event;
mod normalize;
pub mod registry;
pub mod resolver;
mod window;

pub use aggregate::{
    AppUsage, CategoryUsage, DayUsage, DEFAULT_TOP_N, OrganizationSummary, UsageSummary,
    organization_summary, recent_sessions, sessions_today, summarize,
};
pub use attendance::{
    AttendanceStatus, EffectiveHours, ScheduleError, WorkSchedule, attendance_summary,
    daily_effective_hours, effective_hours, group_by_date, group_by_user,
};
pub use category::{Assignment, Category, ResolutionSource, UnknownCategory};
pub use event::{AttendanceEvent, Timestamped, UsageEvent, clean_events};
pub use normalize::normalize_app_name;
pub use resolver::{
    CategoryCache, Classify, ClassifyError, NoClassifier, Resolver, ResolverPolicy,
};
pub use window::{filter_trailing, filter_trailing_owned};
