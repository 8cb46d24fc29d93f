//! Static lookup tables: name overrides, domain lists, keyword fallbacks.
//!
//! All three tables are pure data. Override keys are stored in normalized
//! form (see [`crate::normalize_app_name`]); domain lists match on host
//! suffix; keywords match as substrings of the normalized name.

use crate::category::Category;

/// Exact-match overrides, keyed by normalized app name.
const OVERRIDES: &[(&str, Category)] = &[
    // Work
    ("vscode", Category::Work),
    ("visual studio code", Category::Work),
    ("code", Category::Work),
    ("notion", Category::Work),
    ("slack", Category::Work),
    ("db browser for sqlite", Category::Work),
    ("excel", Category::Work),
    ("word", Category::Work),
    ("outlook", Category::Work),
    // Browsers
    ("google chrome", Category::Browsers),
    ("chrome", Category::Browsers),
    ("firefox", Category::Browsers),
    ("mozilla firefox", Category::Browsers),
    ("microsoft edge", Category::Browsers),
    ("safari", Category::Browsers),
    ("brave", Category::Browsers),
    // Social
    ("whatsapp", Category::Social),
    ("discord", Category::Social),
    ("telegram", Category::Social),
    ("messenger", Category::Social),
    // Entertainment
    ("youtube", Category::Entertainment),
    ("netflix", Category::Entertainment),
    ("spotify", Category::Entertainment),
    ("vlc media player", Category::Entertainment),
    ("steam", Category::Entertainment),
    // Creation/Streaming
    ("obs studio", Category::CreationStreaming),
    ("obs", Category::CreationStreaming),
    ("streamlabs", Category::CreationStreaming),
    ("davinci resolve", Category::CreationStreaming),
    ("audacity", Category::CreationStreaming),
    // SystemTools
    ("terminal", Category::SystemTools),
    ("powershell", Category::SystemTools),
    ("cmd", Category::SystemTools),
    ("settings", Category::SystemTools),
    ("task manager", Category::SystemTools),
    ("file explorer", Category::SystemTools),
];

/// Per-category domain lists for URL-bearing events, in precedence order.
///
/// More specific hosts come before the bare second-level domain so that
/// `docs.google.com` resolves to Work even though `google.com` alone would
/// not match anything here.
const DOMAINS: &[(&str, Category)] = &[
    ("docs.google.com", Category::Work),
    ("drive.google.com", Category::Work),
    ("mail.google.com", Category::Work),
    ("github.com", Category::Work),
    ("gitlab.com", Category::Work),
    ("stackoverflow.com", Category::Work),
    ("notion.so", Category::Work),
    ("slack.com", Category::Work),
    ("linkedin.com", Category::Work),
    ("youtube.com", Category::Entertainment),
    ("netflix.com", Category::Entertainment),
    ("twitch.tv", Category::CreationStreaming),
    ("facebook.com", Category::Social),
    ("instagram.com", Category::Social),
    ("twitter.com", Category::Social),
    ("x.com", Category::Social),
    ("web.whatsapp.com", Category::Social),
    ("reddit.com", Category::Social),
];

/// Keyword fallbacks, matched as substrings of the normalized name.
const KEYWORDS: &[(&str, Category)] = &[
    ("chrome", Category::Browsers),
    ("firefox", Category::Browsers),
    ("edge", Category::Browsers),
    ("opera", Category::Browsers),
    ("youtube", Category::Entertainment),
    ("netflix", Category::Entertainment),
    ("spotify", Category::Entertainment),
    ("whatsapp", Category::Social),
    ("facebook", Category::Social),
    ("instagram", Category::Social),
    ("discord", Category::Social),
    ("studio code", Category::Work),
    ("intellij", Category::Work),
    ("pycharm", Category::Work),
    ("excel", Category::Work),
    ("word", Category::Work),
    ("obs", Category::CreationStreaming),
    ("stream", Category::CreationStreaming),
    ("terminal", Category::SystemTools),
    ("explorer", Category::SystemTools),
];

/// Exact override lookup on a normalized name.
#[must_use]
pub fn lookup_override(normalized_name: &str) -> Option<Category> {
    OVERRIDES
        .iter()
        .find(|(name, _)| *name == normalized_name)
        .map(|(_, category)| *category)
}

/// Domain-list lookup on a URL host.
///
/// Matches when the host equals a listed domain or is a subdomain of it
/// (`www.youtube.com` matches `youtube.com`). First match wins.
#[must_use]
pub fn lookup_domain(host: &str) -> Option<Category> {
    let host = host.to_ascii_lowercase();
    DOMAINS
        .iter()
        .find(|(domain, _)| {
            host == *domain || host.ends_with(&format!(".{domain}"))
        })
        .map(|(_, category)| *category)
}

/// Keyword fallback lookup on a normalized name. First match wins.
#[must_use]
pub fn lookup_keyword(normalized_name: &str) -> Option<Category> {
    KEYWORDS
        .iter()
        .find(|(keyword, _)| normalized_name.contains(keyword))
        .map(|(_, category)| *category)
}
