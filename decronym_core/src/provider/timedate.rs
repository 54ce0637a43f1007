//! Time zone abbreviation pages, one request per abbreviation

use super::Provider;
use super::extract::extract_timezone;
use super::remote::RemoteSource;
use crate::descriptor::ProviderKind;
use crate::error::Result;
use crate::record::Record;
use async_trait::async_trait;

/// Looks abbreviations up at `location + key`
#[derive(Debug)]
pub struct TimeDateProvider {
    remote: RemoteSource,
}

impl TimeDateProvider {
    pub fn new(remote: RemoteSource) -> Self {
        Self { remote }
    }

    pub fn page_url(&self, key: &str) -> String {
        format!("{}{key}", self.remote.url())
    }
}

#[async_trait]
impl Provider for TimeDateProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::TimeDate
    }

    fn validate(&self) -> bool {
        self.remote.is_valid()
    }

    async fn fetch_from_source(&self, key: &str) -> Result<Vec<Record>> {
        let url = self.page_url(key);
        let Some(body) = self.remote.get_optional(&url).await? else {
            return Ok(Vec::new());
        };
        Ok(extract_timezone(&body, key, self.remote.url())
            .into_iter()
            .collect())
    }

    fn cache_key(&self) -> String {
        self.remote.url().to_string()
    }

    async fn probe(&self) -> bool {
        self.validate() && self.remote.probe().await
    }
}
