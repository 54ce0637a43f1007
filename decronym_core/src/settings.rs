//! Runtime settings for the lookup core
//!
//! Everything the core needs from its environment arrives through
//! [`LookupSettings`]. Paths are resolved by the caller, never read from the
//! environment here.

use crate::similarity::{DEFAULT_CUTOFF, DEFAULT_LIMIT};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Duration;

/// Default timeout for content requests
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for liveness probes
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(400);

/// Default number of lookup units polled at once
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Settings shared by the factory, providers and aggregator
#[derive(Debug, Clone)]
pub struct LookupSettings {
    /// Directory holding one cache file per provider
    pub cache_dir: PathBuf,
    pub fetch_timeout: Duration,
    pub probe_timeout: Duration,
    /// Upper bound on concurrently running lookup units
    pub concurrency: usize,
    pub suggestions: SuggestionConfig,
    pub tag_map: TagMap,
}

impl LookupSettings {
    /// Default settings caching into `cache_dir`
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            suggestions: SuggestionConfig::default(),
            tag_map: TagMap::default(),
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set the concurrency bound, clamped to at least one
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_suggestions(mut self, suggestions: SuggestionConfig) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_tag_map(mut self, tag_map: TagMap) -> Self {
        self.tag_map = tag_map;
        self
    }
}

/// How "did you mean" suggestions are produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuggestionConfig {
    pub enabled: bool,
    /// Maximum suggestions per provider
    pub limit: usize,
    /// Minimum similarity in `[0.0, 1.0]`
    pub cutoff: f64,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            limit: DEFAULT_LIMIT,
            cutoff: DEFAULT_CUTOFF,
        }
    }
}

impl SuggestionConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Keyword table deriving tags from free text
///
/// Maps a tag to the keywords that imply it. A tag applies when any of its
/// keywords occurs in the text, ignoring case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagMap(BTreeMap<String, Vec<String>>);

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `keywords` under `tag`
    pub fn insert<I, S>(&mut self, tag: impl Into<String>, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(tag.into())
            .or_default()
            .extend(keywords.into_iter().map(Into::into));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tags whose keywords occur in `text`
    pub fn tags_for(&self, text: &str) -> BTreeSet<String> {
        let haystack = text.to_lowercase();
        self.0
            .iter()
            .filter(|(_, keywords)| {
                keywords
                    .iter()
                    .any(|k| !k.is_empty() && haystack.contains(&k.to_lowercase()))
            })
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }
}

impl<T, K> FromIterator<(T, Vec<K>)> for TagMap
where
    T: Into<String>,
    K: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (T, Vec<K>)>>(iter: I) -> Self {
        let mut map = TagMap::new();
        for (tag, keywords) in iter {
            map.insert(tag, keywords);
        }
        map
    }
}
