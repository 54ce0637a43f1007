//! Shared plumbing for providers backed by an HTTP location

use super::is_valid_url;
use crate::credentials::Credentials;
use crate::error::TransportError;
use crate::settings::LookupSettings;
use crate::transport::{HttpResponse, HttpTransport};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Base URL plus the transport and timeouts used to reach it
#[derive(Clone)]
pub struct RemoteSource {
    url: String,
    transport: Arc<dyn HttpTransport>,
    fetch_timeout: Duration,
    probe_timeout: Duration,
}

impl fmt::Debug for RemoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSource")
            .field("url", &self.url)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("probe_timeout", &self.probe_timeout)
            .finish()
    }
}

impl RemoteSource {
    pub fn new(
        url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        settings: &LookupSettings,
    ) -> Self {
        Self {
            url: url.into(),
            transport,
            fetch_timeout: settings.fetch_timeout,
            probe_timeout: settings.probe_timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_valid(&self) -> bool {
        is_valid_url(&self.url)
    }

    /// GET `url` with the fetch timeout, whatever the status
    pub async fn get(
        &self,
        url: &str,
        auth: Option<&Credentials>,
    ) -> Result<HttpResponse, TransportError> {
        self.transport.get(url, self.fetch_timeout, auth).await
    }

    /// Body of the base URL, failing on any non-2xx status
    pub async fn get_body(&self, auth: Option<&Credentials>) -> Result<String, TransportError> {
        self.get(&self.url, auth).await?.into_body(&self.url)
    }

    /// Body of `url`, `None` on 404, failing on any other non-2xx status
    pub async fn get_optional(&self, url: &str) -> Result<Option<String>, TransportError> {
        let response = self.get(url, None).await?;
        if response.is_not_found() {
            log::debug!("{url} not found");
            return Ok(None);
        }
        response.into_body(url).map(Some)
    }

    /// HEAD the base URL with the probe timeout
    pub async fn probe(&self) -> bool {
        match self.transport.head(&self.url, self.probe_timeout).await {
            Ok(status) => (200..300).contains(&status),
            Err(e) => {
                log::debug!("Probe of {} failed: {e}", self.url);
                false
            }
        }
    }
}
