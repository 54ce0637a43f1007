//! Provider factory
//!
//! Turns descriptors into ready-to-query [`CachedProvider`]s, each with its
//! own content-addressed cache file under the configured cache directory.

use crate::cache::{CacheStore, cache_path_for};
use crate::credentials::CredentialSource;
use crate::descriptor::{ProviderDescriptor, ProviderKind, RawDescriptor, SourceList};
use crate::error::Result;
use crate::provider::confluence::content_url;
use crate::provider::{
    CachedProvider, ConfluenceTableProvider, IsoCurrencyProvider, JsonFileProvider,
    JsonPathProvider, JsonUrlProvider, Provider, RemoteSource, TimeDateProvider,
    WikipediaProvider,
};
use crate::settings::LookupSettings;
use crate::transport::HttpTransport;
use log::{debug, warn};
use std::sync::Arc;

/// `extra` key holding the page id of a table page
pub const PAGE_ID: &str = "page_id";

/// `extra` key holding the file name pattern of a directory source
pub const PATTERN: &str = "pattern";

/// Factory for creating providers from descriptors
pub struct ProviderFactory {
    settings: LookupSettings,
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<dyn CredentialSource>,
}

impl ProviderFactory {
    pub fn new(
        settings: LookupSettings,
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            settings,
            transport,
            credentials,
        }
    }

    pub fn settings(&self) -> &LookupSettings {
        &self.settings
    }

    fn remote(&self, url: impl Into<String>) -> RemoteSource {
        RemoteSource::new(url, self.transport.clone(), &self.settings)
    }

    /// Build the bare provider for a descriptor
    fn build(&self, descriptor: &ProviderDescriptor) -> Result<Box<dyn Provider>> {
        let location = descriptor.location.as_str();
        let provider: Box<dyn Provider> = match descriptor.kind {
            ProviderKind::JsonFile => Box::new(JsonFileProvider::new(location)),
            ProviderKind::JsonPath => match descriptor.extra_str(PATTERN) {
                Some(pattern) => Box::new(JsonPathProvider::with_patterns(location, &[pattern])?),
                None => Box::new(JsonPathProvider::new(location)?),
            },
            ProviderKind::JsonUrl => Box::new(JsonUrlProvider::new(self.remote(location))),
            ProviderKind::TimeDate => Box::new(TimeDateProvider::new(self.remote(location))),
            ProviderKind::IsoCurrency => Box::new(IsoCurrencyProvider::new(self.remote(location))),
            ProviderKind::ConfluenceTable => {
                let page_id = descriptor.require_extra(PAGE_ID)?;
                Box::new(ConfluenceTableProvider::new(
                    self.remote(content_url(location, &page_id)),
                    self.credentials.clone(),
                ))
            }
            ProviderKind::Wikipedia => Box::new(WikipediaProvider::new(
                self.remote(location),
                self.settings.tag_map.clone(),
            )),
        };
        Ok(provider)
    }

    /// Create a provider with its cache loaded from disk
    pub fn create(&self, descriptor: &ProviderDescriptor) -> Result<CachedProvider> {
        let inner = self.build(descriptor)?;
        let path = cache_path_for(&self.settings.cache_dir, &inner.cache_key());
        debug!("{} caches to {}", inner.describe(), path.display());

        Ok(CachedProvider::new(
            inner,
            CacheStore::open(path),
            descriptor.enabled,
            self.settings.suggestions,
        ))
    }

    /// Create every provider that can be built, in descriptor order
    ///
    /// Disabled descriptors are still built so listings can show them.
    /// Failures and repeated `(type, location)` pairs are logged and dropped.
    pub fn from_descriptors<I>(&self, descriptors: I) -> Vec<CachedProvider>
    where
        I: IntoIterator<Item = ProviderDescriptor>,
    {
        let mut seen = SourceList::new();
        let mut providers = Vec::new();

        for descriptor in descriptors {
            if let Err(e) = seen.add(descriptor.clone()) {
                warn!("Skipping source: {e}");
                continue;
            }
            match self.create(&descriptor) {
                Ok(provider) => providers.push(provider),
                Err(e) => warn!("Skipping source {descriptor}: {e}"),
            }
        }

        providers
    }

    /// Parse raw configuration entries and build their providers
    pub fn from_raw<I>(&self, raw: I) -> Vec<CachedProvider>
    where
        I: IntoIterator<Item = RawDescriptor>,
    {
        let (sources, errors) = SourceList::from_raw(raw);
        for e in &errors {
            warn!("Skipping source: {e}");
        }
        self.from_descriptors(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::NoCredentials;
    use crate::error::{ConfigError, Error};
    use crate::transport::ReqwestTransport;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn factory(dir: &TempDir) -> ProviderFactory {
        ProviderFactory::new(
            LookupSettings::new(dir.path().join("cache")),
            Arc::new(ReqwestTransport::new().unwrap()),
            Arc::new(NoCredentials),
        )
    }

    fn raw(kind: &str, location: &str) -> RawDescriptor {
        RawDescriptor {
            kind: kind.to_string(),
            location: location.to_string(),
            enabled: true,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_every_kind_can_be_built() {
        let dir = TempDir::new().unwrap();
        let factory = factory(&dir);

        for kind in ProviderKind::ALL {
            let descriptor = ProviderDescriptor::new(kind, "https://example.com/x/")
                .with_extra(PAGE_ID, "99");
            let provider = factory.create(&descriptor).unwrap();
            assert_eq!(provider.kind(), kind);
        }
    }

    #[test]
    fn test_confluence_requires_page_id() {
        let dir = TempDir::new().unwrap();
        let descriptor =
            ProviderDescriptor::new(ProviderKind::ConfluenceTable, "https://wiki.example.com");

        let err = factory(&dir).create(&descriptor).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingExtra { .. })
        ));
    }

    #[test]
    fn test_confluence_cache_key_is_content_url() {
        let dir = TempDir::new().unwrap();
        let descriptor =
            ProviderDescriptor::new(ProviderKind::ConfluenceTable, "https://wiki.example.com")
                .with_extra(PAGE_ID, 7);

        let provider = factory(&dir).create(&descriptor).unwrap();
        assert_eq!(
            provider.cache_key(),
            "https://wiki.example.com/rest/api/content/7?expand=body.storage"
        );
    }

    #[test]
    fn test_from_raw_drops_bad_entries_and_keeps_order() {
        let dir = TempDir::new().unwrap();
        let mut confluence = raw("confluence_table", "https://wiki.example.com");
        confluence.extra.clear();
        let mut disabled = raw("json_url", "https://example.com/defs.json");
        disabled.enabled = false;

        let providers = factory(&dir).from_raw([
            raw("wikipedia", "https://en.wikipedia.org/wiki/"),
            raw("carrier_pigeon", "coop"),
            confluence,
            raw("wikipedia", "https://en.wikipedia.org/wiki/"),
            disabled,
            raw("json_file", "/defs/a.json"),
        ]);

        let kinds: Vec<_> = providers.iter().map(CachedProvider::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ProviderKind::Wikipedia,
                ProviderKind::JsonUrl,
                ProviderKind::JsonFile
            ]
        );
        assert!(!providers[1].is_enabled());
    }

    #[test]
    fn test_invalid_directory_pattern_is_dropped() {
        let dir = TempDir::new().unwrap();
        let descriptor = ProviderDescriptor::new(ProviderKind::JsonPath, "/defs")
            .with_extra(PATTERN, "[");
        assert!(factory(&dir).from_descriptors([descriptor]).is_empty());
    }
}
