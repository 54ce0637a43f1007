//! Acronym table on an authenticated wiki page

use super::Provider;
use super::extract::extract_table;
use super::remote::RemoteSource;
use crate::credentials::CredentialSource;
use crate::descriptor::ProviderKind;
use crate::error::Result;
use crate::record::Record;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Content API address of a page's storage body
pub fn content_url(base: &str, page_id: &str) -> String {
    format!(
        "{}/rest/api/content/{page_id}?expand=body.storage",
        base.trim_end_matches('/')
    )
}

/// Reads a three-column table from one page, asking for credentials once
pub struct ConfluenceTableProvider {
    remote: RemoteSource,
    credentials: Arc<dyn CredentialSource>,
    table: OnceCell<Vec<Record>>,
}

impl fmt::Debug for ConfluenceTableProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfluenceTableProvider")
            .field("remote", &self.remote)
            .finish()
    }
}

impl ConfluenceTableProvider {
    /// `remote` must already point at the page's [`content_url`]
    pub fn new(remote: RemoteSource, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            remote,
            credentials,
            table: OnceCell::new(),
        }
    }

    async fn load(&self) -> Result<Vec<Record>> {
        let credentials = self.credentials.credentials(self.remote.url()).await;
        if credentials.is_none() {
            log::debug!("No credentials for {}, requesting anonymously", self.remote.url());
        }

        let body = self.remote.get_body(credentials.as_ref()).await?;
        let records = extract_table(&body, self.remote.url())?;
        log::debug!("{} table rows from {}", records.len(), self.remote.url());
        Ok(records)
    }

    async fn table(&self) -> Result<&Vec<Record>> {
        self.table.get_or_try_init(|| self.load()).await
    }
}

#[async_trait]
impl Provider for ConfluenceTableProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::ConfluenceTable
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
