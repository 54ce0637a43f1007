//! Batch resolution across every configured provider
//!
//! [`Aggregator::request`] fans one lookup unit per (provider, acronym) out on
//! the tokio runtime, merges the results in provider registration order and
//! flushes every provider's cache when the batch is done.

use crate::descriptor::ProviderKind;
use crate::provider::{CachedProvider, ProviderStatus};
use crate::record::{Record, is_valid_acronym};
use crate::settings::DEFAULT_CONCURRENCY;
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use std::collections::HashMap;

/// Where a requested acronym ended up after a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<'a> {
    /// At least one record survived filtering
    Matched(&'a [Record]),
    /// Records were found but every one was removed by the tag filter
    Filtered(&'a [Record]),
    /// Nothing found; close cached keys, possibly none
    NotFound { suggestions: &'a [String] },
}

/// Result of refreshing one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub provider: String,
    pub kind: ProviderKind,
    pub status: ProviderStatus,
    /// The source answered its liveness probe
    pub alive: bool,
    /// Records newly cached by the refresh
    pub refreshed: usize,
    pub error: Option<String>,
}

#[derive(Clone, Copy)]
enum QueryKind {
    Exact,
    Fuzzy,
}

enum UnitResult {
    Records(Vec<Record>),
    Suggestions(Vec<String>),
}

/// Fans acronym batches out to providers and keeps the merged results
#[derive(Debug)]
pub struct Aggregator {
    providers: Vec<CachedProvider>,
    concurrency: usize,
    requested: Vec<String>,
    matches: HashMap<String, Vec<Record>>,
    filtered: HashMap<String, Vec<Record>>,
    suggestions: HashMap<String, Vec<String>>,
}

impl Aggregator {
    pub fn new(providers: Vec<CachedProvider>) -> Self {
        Self {
            providers,
            concurrency: DEFAULT_CONCURRENCY,
            requested: Vec::new(),
            matches: HashMap::new(),
            filtered: HashMap::new(),
            suggestions: HashMap::new(),
        }
    }

    /// Maximum number of lookup units in flight at once
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn providers(&self) -> &[CachedProvider] {
        &self.providers
    }

    /// Resolve a batch of acronyms
    ///
    /// Invalid spellings are logged and skipped. Repeated spellings collapse
    /// to their first occurrence. Results of a previous batch are replaced.
    pub async fn request<S: AsRef<str>>(&mut self, acronyms: &[S]) {
        self.requested.clear();
        self.matches.clear();
        self.filtered.clear();
        self.suggestions.clear();

        for acronym in acronyms {
            let acronym = acronym.as_ref();
            if !is_valid_acronym(acronym) {
                warn!("'{acronym}' is not a valid acronym, skipping");
                continue;
            }
            if !self.requested.iter().any(|r| r == acronym) {
                self.requested.push(acronym.to_string());
            }
        }

        if self.requested.is_empty() {
            return;
        }

        // Suggestions read cached keys only, so they run once the exact
        // lookups have populated the caches.
        let exact = self.run_units(QueryKind::Exact).await;
        let fuzzy = self.run_units(QueryKind::Fuzzy).await;

        for (acronym, result) in exact.into_iter().chain(fuzzy) {
            match result {
                UnitResult::Records(records) => {
                    self.matches.entry(acronym).or_default().extend(records);
                }
                UnitResult::Suggestions(found) => {
                    let merged = self.suggestions.entry(acronym).or_default();
                    for suggestion in found {
                        if !merged.contains(&suggestion) {
                            merged.push(suggestion);
                        }
                    }
                }
            }
        }

        debug!(
            "Resolved {} acronyms across {} providers",
            self.requested.len(),
            self.providers.len()
        );
        self.flush().await;
    }

    /// Run one unit per (provider, acronym), results in submission order
    async fn run_units(&self, kind: QueryKind) -> Vec<(String, UnitResult)> {
        let units = self
            .providers
            .iter()
            .flat_map(|provider| self.requested.iter().map(move |a| (provider, a)));

        stream::iter(units)
            .map(|(provider, acronym)| async move {
                let result = match kind {
                    QueryKind::Exact => UnitResult::Records(provider.find_exact(acronym).await),
                    QueryKind::Fuzzy => {
                        UnitResult::Suggestions(provider.find_similar(acronym).await)
                    }
                };
                (acronym.clone(), result)
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Move matched records carrying none of `tags` to the filtered set
    ///
    /// An empty tag list leaves the results untouched.
    pub fn filter_by_tags<S: AsRef<str>>(&mut self, tags: &[S]) {
        if tags.is_empty() {
            return;
        }

        for (acronym, records) in self.matches.iter_mut() {
            let (keep, drop): (Vec<Record>, Vec<Record>) =
                records.drain(..).partition(|r| r.has_any_tag(tags));
            *records = keep;
            if !drop.is_empty() {
                self.filtered
                    .entry(acronym.clone())
                    .or_default()
                    .extend(drop);
            }
        }
    }

    /// Acronyms of the last batch in request order
    pub fn requested(&self) -> &[String] {
        &self.requested
    }

    pub fn matches(&self, acronym: &str) -> &[Record] {
        self.matches.get(acronym).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn filtered(&self, acronym: &str) -> &[Record] {
        self.filtered.get(acronym).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn suggestions(&self, acronym: &str) -> &[String] {
        self.suggestions.get(acronym).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn outcome(&self, acronym: &str) -> Outcome<'_> {
        let matches = self.matches(acronym);
        if !matches.is_empty() {
            return Outcome::Matched(matches);
        }
        let filtered = self.filtered(acronym);
        if !filtered.is_empty() {
            return Outcome::Filtered(filtered);
        }
        Outcome::NotFound {
            suggestions: self.suggestions(acronym),
        }
    }

    /// Probe every enabled provider and reload whole-source tables
    pub async fn update(&self) -> Vec<UpdateReport> {
        let reports: Vec<UpdateReport> = stream::iter(self.providers.iter().filter(|p| p.is_enabled()))
            .map(|provider| async move {
                let alive = provider.probe().await;
                let (refreshed, error) = match provider.refresh().await {
                    Ok(count) => (count, None),
                    Err(e) => (0, Some(e.to_string())),
                };
                info!(
                    "{}: {} ({refreshed} new records)",
                    provider.describe(),
                    if alive { "alive" } else { "unreachable" }
                );
                UpdateReport {
                    provider: provider.describe(),
                    kind: provider.kind(),
                    status: provider.status(),
                    alive,
                    refreshed,
                    error,
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        self.flush().await;
        reports
    }

    /// Persist every changed cache; failures are logged, never fatal
    pub async fn flush(&self) -> usize {
        let mut written = 0;
        for provider in &self.providers {
            match provider.flush().await {
                Ok(true) => written += 1,
                Ok(false) => {}
                Err(e) => warn!("{}: failed to write cache: {e}", provider.describe()),
            }
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::error::Result;
    use crate::provider::Provider;
    use crate::settings::SuggestionConfig;
    use async_trait::async_trait;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Fixed table, optionally slow so completion order differs from
    /// registration order
    struct Fixed {
        name: String,
        records: Vec<Record>,
        delay: Duration,
    }

    #[async_trait]
    impl Provider for Fixed {
        fn kind(&self) -> ProviderKind {
            ProviderKind::JsonFile
        }

        fn validate(&self) -> bool {
            true
        }

        async fn fetch_from_source(&self, _key: &str) -> Result<Vec<Record>> {
            tokio::time::sleep(self.delay).await;
            Ok(self.records.clone())
        }

        fn cache_key(&self) -> String {
            self.name.clone()
        }
    }

    fn record(acronym: &str, full: &str, tags: &[&str]) -> Record {
        Record::new(acronym, full)
            .unwrap()
            .with_tags(tags.iter().copied())
    }

    fn provider(dir: &TempDir, name: &str, records: Vec<Record>, delay_ms: u64) -> CachedProvider {
        CachedProvider::new(
            Box::new(Fixed {
                name: name.to_string(),
                records,
                delay: Duration::from_millis(delay_ms),
            }),
            CacheStore::new(dir.path().join(format!("{name}.json"))),
            true,
            SuggestionConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_invalid_and_repeated_acronyms() {
        let dir = TempDir::new().unwrap();
        let mut aggregator = Aggregator::new(vec![provider(&dir, "a", vec![], 0)]);

        aggregator
            .request(&["API", "", "R&D", "API", "dma", "a b"])
            .await;

        assert_eq!(aggregator.requested(), ["API", "dma"]);
        assert!(aggregator.matches("R&D").is_empty());
    }

    #[tokio::test]
    async fn test_registration_order_wins_over_completion_order() {
        let dir = TempDir::new().unwrap();
        let slow = provider(&dir, "slow", vec![record("API", "Slow Interface", &[])], 50);
        let fast = provider(&dir, "fast", vec![record("API", "Fast Interface", &[])], 0);
        let mut aggregator = Aggregator::new(vec![slow, fast]);

        aggregator.request(&["API"]).await;

        let fulls: Vec<_> = aggregator.matches("API").iter().map(Record::full).collect();
        assert_eq!(fulls, vec!["Slow Interface", "Fast Interface"]);
    }

    #[tokio::test]
    async fn test_duplicates_across_providers_are_kept() {
        let dir = TempDir::new().unwrap();
        let same = || vec![record("API", "Application Programming Interface", &[])];
        let mut aggregator = Aggregator::new(vec![
            provider(&dir, "a", same(), 0),
            provider(&dir, "b", same(), 0),
        ]);

        aggregator.request(&["api"]).await;
        assert_eq!(aggregator.matches("api").len(), 2);
        assert!(aggregator.matches("API").is_empty());
    }

    #[tokio::test]
    async fn test_filter_moves_untagged_records() {
        let dir = TempDir::new().unwrap();
        let mut aggregator = Aggregator::new(vec![
            provider(&dir, "a", vec![record("API", "Old Interface", &["deprecated"])], 0),
            provider(&dir, "b", vec![record("API", "New Interface", &["current"])], 0),
        ]);

        aggregator.request(&["API"]).await;
        aggregator.filter_by_tags(&["deprecated"]);

        assert_eq!(aggregator.matches("API")[0].full(), "Old Interface");
        assert_eq!(aggregator.filtered("API")[0].full(), "New Interface");
        assert!(matches!(aggregator.outcome("API"), Outcome::Matched(r) if r.len() == 1));
    }

    #[tokio::test]
    async fn test_outcomes() {
        let dir = TempDir::new().unwrap();
        let mut aggregator = Aggregator::new(vec![provider(
            &dir,
            "a",
            vec![record("API", "Interface", &["web"]), record("APO", "Post Office", &[])],
            0,
        )]);

        aggregator.request(&["API", "APX"]).await;
        aggregator.filter_by_tags(&["medical"]);

        assert!(matches!(aggregator.outcome("API"), Outcome::Filtered(_)));
        match aggregator.outcome("APX") {
            Outcome::NotFound { suggestions } => {
                assert!(suggestions.contains(&"API".to_string()));
                assert!(suggestions.contains(&"APO".to_string()));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_tag_filter_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut aggregator = Aggregator::new(vec![provider(
            &dir,
            "a",
            vec![record("API", "Interface", &[])],
            0,
        )]);

        aggregator.request(&["API"]).await;
        aggregator.filter_by_tags::<&str>(&[]);

        assert_eq!(aggregator.matches("API").len(), 1);
        assert!(aggregator.filtered("API").is_empty());
    }

    #[tokio::test]
    async fn test_batch_flushes_caches() {
        let dir = TempDir::new().unwrap();
        let mut aggregator = Aggregator::new(vec![provider(
            &dir,
            "a",
            vec![record("API", "Interface", &[])],
            0,
        )]);

        aggregator.request(&["API"]).await;

        let reloaded = CacheStore::open(dir.path().join("a.json"));
        assert_eq!(reloaded.get("api").len(), 1);
        assert_eq!(aggregator.flush().await, 0);
    }

    #[tokio::test]
    async fn test_update_reports_enabled_providers() {
        let dir = TempDir::new().unwrap();
        let disabled = CachedProvider::new(
            Box::new(Fixed {
                name: "off".to_string(),
                records: vec![],
                delay: Duration::ZERO,
            }),
            CacheStore::new(dir.path().join("off.json")),
            false,
            SuggestionConfig::default(),
        );
        let aggregator = Aggregator::new(vec![provider(&dir, "a", vec![], 0), disabled]);

        let reports = aggregator.update().await;
        assert_eq!(reports.len(), 1);
        assert!(reports[0].alive);
        assert_eq!(reports[0].refreshed, 0);
        assert!(reports[0].error.is_none());
    }
}
