//! Layered category resolution with memoization.
//!
//! Resolution walks a fixed fallback chain, short-circuiting on the first
//! step that produces a category:
//!
//! 1. cache lookup on the normalized name
//! 2. static override table
//! 3. URL domain heuristic (URL-bearing events only)
//! 4. remote classification service (name-only events only)
//! 5. keyword fallback, then the configured default
//!
//! Every successful resolution is written back to the cache, so the second
//! call for the same normalized name always takes the cache path. Cache
//! entries are trusted unconditionally, even when a lower-confidence step
//! produced them; clearing the cache is an external operation.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use crate::category::{Assignment, Category, ResolutionSource};
use crate::normalize::normalize_app_name;
use crate::registry;

/// Errors from a remote classification backend.
///
/// The resolver treats every variant identically: log and fall through to
/// the keyword step. Nothing here is fatal.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The service could not be reached or timed out.
    #[error("classifier unavailable: {0}")]
    Unavailable(String),
    /// The service answered, but not with a usable category.
    #[error("invalid classifier response: {0}")]
    InvalidResponse(String),
}

/// A remote classification backend.
///
/// Implementations must be time-boxed; a slow classifier stalls resolution
/// for exactly one name, never the whole batch.
pub trait Classify: Send + Sync {
    /// Classifies a normalized app name into one of the closed categories.
    fn classify(&self, normalized_name: &str) -> Result<Category, ClassifyError>;
}

impl<C: Classify + ?Sized> Classify for Box<C> {
    fn classify(&self, normalized_name: &str) -> Result<Category, ClassifyError> {
        (**self).classify(normalized_name)
    }
}

/// A classifier for offline operation: always falls through.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClassifier;

impl Classify for NoClassifier {
    fn classify(&self, _normalized_name: &str) -> Result<Category, ClassifyError> {
        Err(ClassifyError::Unavailable("no classifier configured".into()))
    }
}

/// Process-wide memoization of category assignments.
///
/// Keyed by normalized app name. Unbounded; entries never expire. The map
/// is guarded so that concurrent resolutions of the same name are benign
/// (idempotent, last-write-wins) and no reader observes a partial entry.
#[derive(Debug, Default)]
pub struct CategoryCache {
    entries: RwLock<HashMap<String, Assignment>>,
}

impl CategoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a prior assignment for a normalized name.
    #[must_use]
    pub fn get(&self, normalized_name: &str) -> Option<Assignment> {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(normalized_name)
            .copied()
    }

    /// Records an assignment for a normalized name.
    pub fn insert(&self, normalized_name: &str, assignment: Assignment) {
        self.entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(normalized_name.to_string(), assignment);
    }

    /// Drops every cached assignment. Subsequent resolutions re-derive
    /// categories through the full fallback chain.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all entries, for persistence by an external store.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, Assignment)> {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    /// Restores entries from a persisted snapshot.
    pub fn preload<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, Assignment)>,
    {
        let mut map = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        for (name, assignment) in entries {
            map.insert(name, assignment);
        }
    }
}

/// Last-resort category policy.
///
/// The defaults mirror the documented behavior: `SystemTools` for name-only
/// resolution, `Browsers` for URL-bearing events whose host matches no
/// domain list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverPolicy {
    pub name_fallback: Category,
    pub url_fallback: Category,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self {
            name_fallback: Category::SystemTools,
            url_fallback: Category::Browsers,
        }
    }
}

/// Resolves `(app name, optional url)` pairs to categories.
///
/// Owns the cache and the (optional) remote classifier. `resolve` is total:
/// malformed input degrades to the lowest-confidence fallback instead of
/// erroring.
pub struct Resolver<C: Classify = NoClassifier> {
    cache: CategoryCache,
    classifier: C,
    policy: ResolverPolicy,
}

impl Resolver<NoClassifier> {
    /// A resolver with no remote classifier and default policy.
    #[must_use]
    pub fn offline() -> Self {
        Self::new(NoClassifier, ResolverPolicy::default())
    }
}

impl<C: Classify> Resolver<C> {
    #[must_use]
    pub fn new(classifier: C, policy: ResolverPolicy) -> Self {
        Self {
            cache: CategoryCache::new(),
            classifier,
            policy,
        }
    }

    /// Access to the underlying cache, for clearing or persistence.
    #[must_use]
    pub const fn cache(&self) -> &CategoryCache {
        &self.cache
    }

    /// Resolves an app name (and optional source URL) to a category.
    pub fn resolve(&self, app_name: &str, url: Option<&str>) -> Category {
        self.resolve_with_source(app_name, url).category
    }

    /// Like [`Self::resolve`], also reporting which step answered.
    pub fn resolve_with_source(&self, app_name: &str, url: Option<&str>) -> Assignment {
        let key = normalize_app_name(app_name);

        if let Some(cached) = self.cache.get(&key) {
            return Assignment {
                category: cached.category,
                source: ResolutionSource::Cache,
            };
        }

        let assignment = self.resolve_uncached(&key, url);
        self.cache.insert(&key, assignment);
        assignment
    }

    fn resolve_uncached(&self, key: &str, url: Option<&str>) -> Assignment {
        if let Some(category) = registry::lookup_override(key) {
            return Assignment {
                category,
                source: ResolutionSource::Override,
            };
        }

        if let Some(url) = url {
            let category = host_of(url)
                .and_then(registry::lookup_domain)
                .unwrap_or(self.policy.url_fallback);
            return Assignment {
                category,
                source: ResolutionSource::DomainHeuristic,
            };
        }

        match self.classifier.classify(key) {
            Ok(category) => {
                return Assignment {
                    category,
                    source: ResolutionSource::Remote,
                };
            }
            Err(err) => {
                tracing::debug!(name = key, error = %err, "remote classification failed, falling back");
            }
        }

        let category = registry::lookup_keyword(key).unwrap_or(self.policy.name_fallback);
        Assignment {
            category,
            source: ResolutionSource::KeywordFallback,
        }
    }
}

/// Extracts the host portion of a URL-ish string.
///
/// Scheme and userinfo are optional, anything after the authority is
/// ignored. Returns `None` for strings with no host at all.
pub(crate) fn host_of(url: &str) -> Option<&str> {
    let rest = url
        .split_once("://")
        .map_or(url, |(_, after_scheme)| after_scheme);
    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(rest);
    let host = authority
        .rsplit_once('@')
        .map_or(authority, |(_, after_userinfo)| after_userinfo);
    let host = host.split(':').next().unwrap_or(host);
    if host.is_empty() { None } else { Some(host) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted classifier: returns a fixed answer and counts calls.
    struct FixedClassifier {
        answer: Result<Category, ()>,
        calls: AtomicUsize,
    }

    impl FixedClassifier {
        fn answering(category: Category) -> Self {
            Self {
                answer: Ok(category),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                answer: Err(()),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Classify for FixedClassifier {
        fn classify(&self, _normalized_name: &str) -> Result<Category, ClassifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .map_err(|()| ClassifyError::Unavailable("scripted failure".into()))
        }
    }

    #[test]
    fn override_wins_before_remote() {
        let resolver = Resolver::new(
            FixedClassifier::answering(Category::Entertainment),
            ResolverPolicy::default(),
        );
        let assignment = resolver.resolve_with_source("Google Chrome", None);
        assert_eq!(assignment.category, Category::Browsers);
        assert_eq!(assignment.source, ResolutionSource::Override);
    }

    #[test]
    fn url_domain_heuristic() {
        let resolver = Resolver::offline();
        assert_eq!(
            resolver.resolve("My Browser Tab", Some("https://www.youtube.com/watch?v=abc")),
            Category::Entertainment
        );
        assert_eq!(
            resolver.resolve("Another Tab", Some("https://docs.google.com/d/xyz")),
            Category::Work
        );
    }

    #[test]
    fn url_without_domain_match_defaults_to_browsers() {
        let resolver = Resolver::offline();
        let assignment =
            resolver.resolve_with_source("Obscure Site", Some("https://example.org/page"));
        assert_eq!(assignment.category, Category::Browsers);
        assert_eq!(assignment.source, ResolutionSource::DomainHeuristic);
    }

    #[test]
    fn remote_answer_is_accepted_for_name_only() {
        let resolver = Resolver::new(
            FixedClassifier::answering(Category::Work),
            ResolverPolicy::default(),
        );
        let assignment = resolver.resolve_with_source("Bespoke Editor", None);
        assert_eq!(assignment.category, Category::Work);
        assert_eq!(assignment.source, ResolutionSource::Remote);
    }

    #[test]
    fn remote_failure_falls_through_to_keywords() {
        let resolver = Resolver::new(FixedClassifier::failing(), ResolverPolicy::default());
        let assignment = resolver.resolve_with_source("My Firefox Fork", None);
        assert_eq!(assignment.category, Category::Browsers);
        assert_eq!(assignment.source, ResolutionSource::KeywordFallback);
    }

    #[test]
    fn nothing_matches_uses_name_fallback() {
        let resolver = Resolver::offline();
        let assignment = resolver.resolve_with_source("Qzx Utility", None);
        assert_eq!(assignment.category, Category::SystemTools);
        assert_eq!(assignment.source, ResolutionSource::KeywordFallback);
    }

    #[test]
    fn garbage_input_still_resolves() {
        let resolver = Resolver::offline();
        // Normalizes to the empty string; must not panic, must yield the default
        assert_eq!(resolver.resolve("!!!", None), Category::SystemTools);
    }

    #[test]
    fn second_call_hits_cache_without_remote() {
        let classifier = FixedClassifier::answering(Category::Social);
        let resolver = Resolver::new(classifier, ResolverPolicy::default());

        let first = resolver.resolve_with_source("Chat Thing", None);
        assert_eq!(first.source, ResolutionSource::Remote);

        let second = resolver.resolve_with_source("Chat Thing", None);
        assert_eq!(second.category, first.category);
        assert_eq!(second.source, ResolutionSource::Cache);
        assert_eq!(resolver.classifier.call_count(), 1);
    }

    #[test]
    fn cache_key_is_normalized() {
        let resolver = Resolver::offline();
        resolver.resolve("OBS-Studio", None);
        let second = resolver.resolve_with_source("obs studio", None);
        assert_eq!(second.source, ResolutionSource::Cache);
    }

    #[test]
    fn clearing_cache_reruns_the_chain() {
        let classifier = FixedClassifier::answering(Category::Work);
        let resolver = Resolver::new(classifier, ResolverPolicy::default());

        resolver.resolve("Bespoke Editor", None);
        assert_eq!(resolver.classifier.call_count(), 1);

        resolver.cache().clear();
        let again = resolver.resolve_with_source("Bespoke Editor", None);
        assert_eq!(again.source, ResolutionSource::Remote);
        assert_eq!(resolver.classifier.call_count(), 2);
    }

    #[test]
    fn custom_policy_is_honored() {
        let policy = ResolverPolicy {
            name_fallback: Category::Work,
            url_fallback: Category::Entertainment,
        };
        let resolver = Resolver::new(NoClassifier, policy);
        assert_eq!(resolver.resolve("Qzx Utility", None), Category::Work);
        assert_eq!(
            resolver.resolve("Tab", Some("https://example.org")),
            Category::Entertainment
        );
    }

    #[test]
    fn cache_snapshot_roundtrip() {
        let resolver = Resolver::offline();
        resolver.resolve("Google Chrome", None);
        resolver.resolve("Qzx Utility", None);

        let snapshot = resolver.cache().entries();
        assert_eq!(snapshot.len(), 2);

        let restored = CategoryCache::new();
        restored.preload(snapshot);
        assert_eq!(restored.len(), 2);
        assert_eq!(
            restored.get("google chrome").map(|a| a.category),
            Some(Category::Browsers)
        );
    }

    #[test]
    fn host_extraction() {
        assert_eq!(host_of("https://www.youtube.com/watch?v=1"), Some("www.youtube.com"));
        assert_eq!(host_of("http://user@host.example:8080/p"), Some("host.example"));
        assert_eq!(host_of("docs.google.com/document"), Some("docs.google.com"));
        assert_eq!(host_of(""), None);
        assert_eq!(host_of("https://"), None);
    }
}
