//! Definition providers
//!
//! A [`Provider`] knows how to reach one backing source. [`CachedProvider`]
//! puts that source behind its own [`CacheStore`] and session validity state
//! and implements `find` once for every variant.

pub mod confluence;
pub mod currency;
pub mod extract;
pub mod json_file;
pub mod json_path;
pub mod json_url;
pub mod remote;
pub mod timedate;
pub mod wikipedia;

pub use confluence::ConfluenceTableProvider;
pub use currency::IsoCurrencyProvider;
pub use json_file::JsonFileProvider;
pub use json_path::JsonPathProvider;
pub use json_url::JsonUrlProvider;
pub use remote::RemoteSource;
pub use timedate::TimeDateProvider;
pub use wikipedia::WikipediaProvider;

use crate::cache::CacheStore;
use crate::descriptor::ProviderKind;
use crate::error::Result;
use crate::record::{Record, fold_key};
use crate::settings::SuggestionConfig;
use crate::similarity::close_matches;
use async_trait::async_trait;
use log::{debug, warn};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::Mutex;

/// Variant-specific capability set of a definition source
#[async_trait]
pub trait Provider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Cheap check that the configured location is well formed
    ///
    /// Never touches the network.
    fn validate(&self) -> bool;

    /// Look `key` (already case-folded) up in the backing source
    ///
    /// May return records for other keys too. Whole-source variants return
    /// their entire table so the cache mirrors it.
    async fn fetch_from_source(&self, key: &str) -> Result<Vec<Record>>;

    /// Identifying location, hashed into the cache file name
    fn cache_key(&self) -> String;

    /// Human readable label for logs and listings
    fn describe(&self) -> String {
        format!("{} {}", self.kind(), self.cache_key())
    }

    /// Liveness check
    ///
    /// Network variants send a HEAD request with the short probe timeout.
    async fn probe(&self) -> bool {
        self.validate()
    }

    /// The whole table, for variants that load their source in one go
    ///
    /// `None` means the source is only queried one key at a time.
    async fn fetch_all(&self) -> Result<Option<Vec<Record>>> {
        Ok(None)
    }
}

/// One item returned by [`CachedProvider::find`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindHit {
    /// Definition for the requested key
    Record(Record),
    /// Cached key close to the requested one
    Suggestion(String),
}

/// Session state of a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    Disabled,
    /// Not validated yet; happens on first use
    Unchecked,
    Valid,
    /// Failed validation or a fetch; skipped for the rest of the session
    Invalid,
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Disabled => "disabled",
            Self::Unchecked => "unchecked",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        };
        f.write_str(label)
    }
}

const UNCHECKED: u8 = 0;
const VALID: u8 = 1;
const INVALID: u8 = 2;

/// A provider with its cache and session validity
pub struct CachedProvider {
    inner: Box<dyn Provider>,
    enabled: bool,
    validity: AtomicU8,
    cache: Mutex<CacheStore>,
    suggestions: SuggestionConfig,
}

impl fmt::Debug for CachedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedProvider")
            .field("provider", &self.inner.describe())
            .field("enabled", &self.enabled)
            .field("status", &self.status())
            .finish()
    }
}

impl CachedProvider {
    pub fn new(
        inner: Box<dyn Provider>,
        cache: CacheStore,
        enabled: bool,
        suggestions: SuggestionConfig,
    ) -> Self {
        Self {
            inner,
            enabled,
            validity: AtomicU8::new(UNCHECKED),
            cache: Mutex::new(cache),
            suggestions,
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.inner.kind()
    }

    pub fn describe(&self) -> String {
        self.inner.describe()
    }

    pub fn cache_key(&self) -> String {
        self.inner.cache_key()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn status(&self) -> ProviderStatus {
        if !self.enabled {
            return ProviderStatus::Disabled;
        }
        match self.validity.load(Ordering::Acquire) {
            VALID => ProviderStatus::Valid,
            INVALID => ProviderStatus::Invalid,
            _ => ProviderStatus::Unchecked,
        }
    }

    /// Validate on first use, then remember the outcome for the session
    fn is_valid(&self) -> bool {
        match self.validity.load(Ordering::Acquire) {
            VALID => true,
            INVALID => false,
            _ => {
                let valid = self.inner.validate();
                let state = if valid { VALID } else { INVALID };
                // A concurrent invalidation wins over a late validation
                let _ = self.validity.compare_exchange(
                    UNCHECKED,
                    state,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                );
                if !valid {
                    warn!("{} is not valid, skipping", self.describe());
                }
                self.validity.load(Ordering::Acquire) == VALID
            }
        }
    }

    fn mark_invalid(&self) {
        self.validity.store(INVALID, Ordering::Release);
    }

    fn is_usable(&self) -> bool {
        self.enabled && self.is_valid()
    }

    /// Look up `key`, case-insensitively
    ///
    /// With `exact`, cached records are returned as is and a miss goes to the
    /// backing source. With `fuzzy`, close keys from the cache are appended;
    /// the source is never consulted for those.
    pub async fn find(&self, key: &str, exact: bool, fuzzy: bool) -> Vec<FindHit> {
        if !exact && !fuzzy {
            warn!(
                "{}: neither exact nor fuzzy lookup requested for '{key}'",
                self.describe()
            );
            return Vec::new();
        }

        let mut hits = Vec::new();
        if exact {
            hits.extend(self.find_exact(key).await.into_iter().map(FindHit::Record));
        }
        if fuzzy {
            hits.extend(
                self.find_similar(key)
                    .await
                    .into_iter()
                    .map(FindHit::Suggestion),
            );
        }
        hits
    }

    /// Records for `key`, fetching from the source on a cache miss
    pub async fn find_exact(&self, key: &str) -> Vec<Record> {
        if !self.is_usable() {
            return Vec::new();
        }

        let key = fold_key(key);
        {
            let cache = self.cache.lock().await;
            if cache.contains(&key) {
                debug!("{}: cache hit for '{key}'", self.describe());
                return cache.get(&key).to_vec();
            }
        }

        match self.inner.fetch_from_source(&key).await {
            Ok(records) => {
                let mut cache = self.cache.lock().await;
                let added = cache.add(records);
                debug!(
                    "{}: fetched '{key}', {added} new records cached",
                    self.describe()
                );
                cache.get(&key).to_vec()
            }
            Err(e) => {
                if e.invalidates_provider() {
                    warn!("{}: {e}; disabled for this session", self.describe());
                    self.mark_invalid();
                } else {
                    warn!("{}: lookup of '{key}' failed: {e}", self.describe());
                }
                Vec::new()
            }
        }
    }

    /// Cached acronyms close to `key`, best first
    pub async fn find_similar(&self, key: &str) -> Vec<String> {
        if !self.suggestions.enabled || !self.is_usable() {
            return Vec::new();
        }

        let cache = self.cache.lock().await;
        close_matches(
            key,
            cache.keys(),
            self.suggestions.limit,
            self.suggestions.cutoff,
        )
        .into_iter()
        .map(|k| {
            cache
                .get(k)
                .first()
                .map_or_else(|| k.to_string(), |r| r.acronym().to_string())
        })
        .collect()
    }

    /// Liveness of the provider's source
    pub async fn probe(&self) -> bool {
        self.is_usable() && self.inner.probe().await
    }

    /// Reload a whole-source provider's table into the cache
    ///
    /// Returns the number of newly cached records. Per-key providers are
    /// left untouched.
    pub async fn refresh(&self) -> Result<usize> {
        if !self.is_usable() {
            return Ok(0);
        }

        match self.inner.fetch_all().await {
            Ok(Some(records)) => Ok(self.cache.lock().await.add(records)),
            Ok(None) => Ok(0),
            Err(e) => {
                if e.invalidates_provider() {
                    self.mark_invalid();
                }
                Err(e)
            }
        }
    }

    /// Number of keys currently cached
    pub async fn cached_keys(&self) -> usize {
        self.cache.lock().await.len()
    }

    /// Persist the cache if it changed
    pub async fn flush(&self) -> Result<bool> {
        let mut cache = self.cache.lock().await;
        let written = cache.save()?;
        if written {
            debug!(
                "{}: cache written to {}",
                self.describe(),
                cache.path().display()
            );
        }
        Ok(written)
    }
}

/// Whether `location` is an absolute http(s) URL with a host
pub(crate) fn is_valid_url(location: &str) -> bool {
    url::Url::parse(location)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some_and(|h| !h.is_empty()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, TransportError};
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    /// Per-key source backed by a fixed table, counting fetches
    struct TableProvider {
        records: Vec<Record>,
        valid: bool,
        fail: bool,
        fetches: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Provider for TableProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::JsonFile
        }

        fn validate(&self) -> bool {
            self.valid
        }

        async fn fetch_from_source(&self, key: &str) -> Result<Vec<Record>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Transport(TransportError::timeout("http://x")));
            }
            Ok(self
                .records
                .iter()
                .filter(|r| r.lookup_key() == key)
                .cloned()
                .collect())
        }

        fn cache_key(&self) -> String {
            "table".to_string()
        }
    }

    struct Fixture {
        _dir: TempDir,
        provider: CachedProvider,
        fetches: Arc<AtomicUsize>,
    }

    fn fixture(valid: bool, fail: bool, enabled: bool) -> Fixture {
        let dir = TempDir::new().unwrap();
        let fetches = Arc::new(AtomicUsize::new(0));
        let inner = TableProvider {
            records: vec![
                Record::new("DMA", "Direct Memory Access").unwrap(),
                Record::new("XYY", "Example Y").unwrap(),
                Record::new("XZZ", "Example Z").unwrap(),
            ],
            valid,
            fail,
            fetches: fetches.clone(),
        };
        let store = CacheStore::new(dir.path().join("table.json"));
        let provider =
            CachedProvider::new(Box::new(inner), store, enabled, SuggestionConfig::default());
        Fixture {
            _dir: dir,
            provider,
            fetches,
        }
    }

    #[tokio::test]
    async fn test_key_is_case_insensitive() {
        let f = fixture(true, false, true);
        for key in ["dma", "DMA", "Dma"] {
            let records = f.provider.find_exact(key).await;
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].full(), "Direct Memory Access");
        }
        assert_eq!(f.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_source() {
        let f = fixture(true, false, true);
        f.provider.find_exact("dma").await;
        f.provider.find_exact("dma").await;
        assert_eq!(f.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disabled_provider_returns_nothing() {
        let f = fixture(true, false, false);
        assert!(f.provider.find("dma", true, true).await.is_empty());
        assert_eq!(f.fetches.load(Ordering::SeqCst), 0);
        assert_eq!(f.provider.status(), ProviderStatus::Disabled);
    }

    #[tokio::test]
    async fn test_invalid_provider_is_skipped() {
        let f = fixture(false, false, true);
        assert!(f.provider.find("dma", true, true).await.is_empty());
        assert_eq!(f.fetches.load(Ordering::SeqCst), 0);
        assert_eq!(f.provider.status(), ProviderStatus::Invalid);
    }

    #[tokio::test]
    async fn test_transport_failure_invalidates_for_session() {
        let f = fixture(true, true, true);
        assert!(f.provider.find_exact("dma").await.is_empty());
        assert!(f.provider.find_exact("xyy").await.is_empty());

        assert_eq!(f.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(f.provider.status(), ProviderStatus::Invalid);
    }

    #[tokio::test]
    async fn test_similar_only_reads_cache() {
        let f = fixture(true, false, true);
        f.provider.find_exact("xyy").await;
        f.provider.find_exact("xzz").await;
        let before = f.fetches.load(Ordering::SeqCst);

        let hits = f.provider.find("XYZ", false, true).await;

        assert_eq!(
            hits,
            vec![
                FindHit::Suggestion("XYY".to_string()),
                FindHit::Suggestion("XZZ".to_string())
            ]
        );
        assert_eq!(f.fetches.load(Ordering::SeqCst), before);
    }

    #[tokio::test]
    async fn test_neither_flag_returns_nothing() {
        let f = fixture(true, false, true);
        assert!(f.provider.find("dma", false, false).await.is_empty());
        assert_eq!(f.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_flush_writes_once() {
        let f = fixture(true, false, true);
        f.provider.find_exact("dma").await;

        assert!(f.provider.flush().await.unwrap());
        assert!(!f.provider.flush().await.unwrap());
    }

    #[test]
    fn test_url_validation() {
        assert!(is_valid_url("https://en.wikipedia.org/wiki/"));
        assert!(is_valid_url("http://localhost:8080/defs.json"));
        assert!(!is_valid_url("ftp://example.com/x"));
        assert!(!is_valid_url("/home/user/defs.json"));
        assert!(!is_valid_url("not a url"));
    }
}
