//! Category enum as the single source of truth for category labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic categories applications are classified into.
///
/// This is a closed set: every resolution yields exactly one of these six
/// values. There is no catch-all "Other" variant; names that match nothing
/// fall back to a configured default instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Work,
    Browsers,
    Social,
    Entertainment,
    CreationStreaming,
    SystemTools,
}

impl Category {
    /// All categories in canonical order.
    ///
    /// Aggregation output lists every category in this order, including
    /// those with zero recorded time.
    pub const ALL: [Self; 6] = [
        Self::Work,
        Self::Browsers,
        Self::Social,
        Self::Entertainment,
        Self::CreationStreaming,
        Self::SystemTools,
    ];

    /// Canonical label, also used for storage and wire payloads.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Browsers => "Browsers",
            Self::Social => "Social",
            Self::Entertainment => "Entertainment",
            Self::CreationStreaming => "Creation/Streaming",
            Self::SystemTools => "SystemTools",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Work" => Ok(Self::Work),
            "Browsers" => Ok(Self::Browsers),
            "Social" => Ok(Self::Social),
            "Entertainment" => Ok(Self::Entertainment),
            "Creation/Streaming" => Ok(Self::CreationStreaming),
            "SystemTools" => Ok(Self::SystemTools),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for labels outside the closed category set.
#[derive(Debug, Clone)]
pub struct UnknownCategory(String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

/// Which fallback step produced a category assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionSource {
    /// A prior resolution for the same normalized name.
    Cache,
    /// Exact match in the static override table.
    Override,
    /// URL host matched a per-category domain list.
    DomainHeuristic,
    /// The remote classification service answered with a valid category.
    Remote,
    /// Substring match in the keyword table, or the configured default.
    KeywordFallback,
}

impl ResolutionSource {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Override => "override",
            Self::DomainHeuristic => "domain-heuristic",
            Self::Remote => "remote",
            Self::KeywordFallback => "keyword-fallback",
        }
    }
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResolutionSource {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cache" => Ok(Self::Cache),
            "override" => Ok(Self::Override),
            "domain-heuristic" => Ok(Self::DomainHeuristic),
            "remote" => Ok(Self::Remote),
            "keyword-fallback" => Ok(Self::KeywordFallback),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// The result of resolving one `(app name, url)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub category: Category,
    pub source: ResolutionSource,
}
