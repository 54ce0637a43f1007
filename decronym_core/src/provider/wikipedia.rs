//! Encyclopedia pages, one request per acronym

use super::Provider;
use super::extract::extract_wiki;
use super::remote::RemoteSource;
use crate::descriptor::ProviderKind;
use crate::error::Result;
use crate::record::Record;
use crate::settings::TagMap;
use async_trait::async_trait;

/// Reads the article or disambiguation page at `location + KEY`
#[derive(Debug)]
pub struct WikipediaProvider {
    remote: RemoteSource,
    tag_map: TagMap,
}

impl WikipediaProvider {
    pub fn new(remote: RemoteSource, tag_map: TagMap) -> Self {
        Self { remote, tag_map }
    }

    pub fn page_url(&self, key: &str) -> String {
        format!("{}{}", self.remote.url(), key.to_uppercase())
    }
}

#[async_trait]
impl Provider for WikipediaProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Wikipedia
    }

    fn validate(&self) -> bool {
        self.remote.is_valid()
    }

    async fn fetch_from_source(&self, key: &str) -> Result<Vec<Record>> {
        let url = self.page_url(key);
        let Some(body) = self.remote.get_optional(&url).await? else {
            return Ok(Vec::new());
        };
        let records = extract_wiki(&body, key, &url, &self.tag_map);
        log::debug!("{} definitions on {url}", records.len());
        Ok(records)
    }

    fn cache_key(&self) -> String {
        self.remote.url().to_string()
    }

    async fn probe(&self) -> bool {
        self.validate() && self.remote.probe().await
    }
}
