//! ISO 4217 currency list

use super::Provider;
use super::extract::extract_currencies;
use super::remote::RemoteSource;
use crate::descriptor::ProviderKind;
use crate::error::Result;
use crate::record::Record;
use async_trait::async_trait;
use tokio::sync::OnceCell;

/// Downloads the currency list once and serves every code from it
#[derive(Debug)]
pub struct IsoCurrencyProvider {
    remote: RemoteSource,
    table: OnceCell<Vec<Record>>,
}

impl IsoCurrencyProvider {
    pub fn new(remote: RemoteSource) -> Self {
        Self {
            remote,
            table: OnceCell::new(),
        }
    }

    async fn load(&self) -> Result<Vec<Record>> {
        let body = self.remote.get_body(None).await?;
        Ok(extract_currencies(&body, self.remote.url())?)
    }

    async fn table(&self) -> Result<&Vec<Record>> {
        self.table.get_or_try_init(|| self.load()).await
    }
}

#[async_trait]
impl Provider for IsoCurrencyProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::IsoCurrency
    }

    fn validate(&self) -> bool {
        self.remote.is_valid()
    }

    /// Entries whose code matches `key`; the rest stay in memory
    async fn fetch_from_source(&self, key: &str) -> Result<Vec<Record>> {
        Ok(self
            .table()
            .await?
            .iter()
            .filter(|r| r.lookup_key() == key)
            .cloned()
            .collect())
    }

    fn cache_key(&self) -> String {
        self.remote.url().to_string()
    }

    async fn probe(&self) -> bool {
        self.validate() && self.remote.probe().await
    }

    async fn fetch_all(&self) -> Result<Option<Vec<Record>>> {
        Ok(Some(self.table().await?.clone()))
    }
}
