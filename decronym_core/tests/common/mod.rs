//! Common test utilities for integration tests
//!
//! Builds factories wired to a scripted transport and a temporary cache
//! directory.

#![allow(dead_code)]

use decronym_core::{
    CredentialSource, LookupSettings, NoCredentials, ProviderDescriptor, ProviderFactory,
};
use decronym_core::{CachedProvider, ProviderKind};
use decronym_test_utils::MockTransport;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub const TIMEDATE_URL: &str = "https://www.timeanddate.com/time/zones/";
pub const CURRENCY_URL: &str = "https://www.six-group.com/dam/download/list-one.xml";
pub const WIKI_URL: &str = "https://en.wikipedia.org/wiki/";
pub const FEED_URL: &str = "https://defs.example.com/acronyms.json";
pub const CONFLUENCE_BASE: &str = "https://wiki.example.com";

/// Temporary workspace plus the transport every provider talks to
pub struct LookupHarness {
    pub dir: TempDir,
    pub transport: MockTransport,
}

impl LookupHarness {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            transport: MockTransport::new(),
        }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    pub fn settings(&self) -> LookupSettings {
        LookupSettings::new(self.cache_dir())
    }

    pub fn factory(&self) -> ProviderFactory {
        self.factory_with(Arc::new(NoCredentials))
    }

    pub fn factory_with(&self, credentials: Arc<dyn CredentialSource>) -> ProviderFactory {
        ProviderFactory::new(
            self.settings(),
            Arc::new(self.transport.clone()),
            credentials,
        )
    }

    pub fn provider(&self, kind: ProviderKind, location: &str) -> CachedProvider {
        self.factory()
            .create(&ProviderDescriptor::new(kind, location))
            .unwrap()
    }
}
