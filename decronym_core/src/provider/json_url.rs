//! Remote definitions feed

use super::Provider;
use super::remote::RemoteSource;
use crate::definitions::parse_definitions;
use crate::descriptor::ProviderKind;
use crate::error::Result;
use crate::record::Record;
use async_trait::async_trait;
use tokio::sync::OnceCell;

/// Downloads a `{meta, defs}` document once per session
#[derive(Debug)]
pub struct JsonUrlProvider {
    remote: RemoteSource,
    table: OnceCell<Vec<Record>>,
}

impl JsonUrlProvider {
    pub fn new(remote: RemoteSource) -> Self {
        Self {
            remote,
            table: OnceCell::new(),
        }
    }

    async fn load(&self) -> Result<Vec<Record>> {
        let body = self.remote.get_body(None).await?;
        let records = parse_definitions(&body, self.remote.url())?;
        log::debug!(
            "Downloaded {} definitions from {}",
            records.len(),
            self.remote.url()
        );
        Ok(records)
    }

    async fn table(&self) -> Result<&Vec<Record>> {
        self.table.get_or_try_init(|| self.load()).await
    }
}

#[async_trait]
impl Provider for JsonUrlProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::JsonUrl
    }

    fn validate(&self) -> bool {
        self.remote.is_valid()
    }

    async fn fetch_from_source(&self, _key: &str) -> Result<Vec<Record>> {
        Ok(self.table().await?.clone())
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
