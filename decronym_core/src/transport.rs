//! HTTP transport seam
//!
//! Providers talk to the network only through [`HttpTransport`], so tests can
//! script responses and count calls. Every request carries its own timeout and
//! there are no retries.

use crate::credentials::Credentials;
use crate::error::TransportError;
use async_trait::async_trait;
use log::{debug, trace};
use std::time::Duration;

/// Status and body of a completed HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 response with `body`
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// The body of a 2xx response, or a status error for anything else
    pub fn into_body(self, url: &str) -> Result<String, TransportError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(TransportError::status(url, self.status))
        }
    }
}

/// Asynchronous HTTP client used by network providers
///
/// Implementations return `Ok` for any response the server sent, whatever its
/// status. Interpreting the status is up to the caller.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET `url` with an optional basic-auth header
    async fn get(
        &self,
        url: &str,
        timeout: Duration,
        auth: Option<&Credentials>,
    ) -> Result<HttpResponse, TransportError>;

    /// HEAD `url`, returning the status code
    async fn head(&self, url: &str, timeout: Duration) -> Result<u16, TransportError>;
}

/// [`HttpTransport`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with the crate's user agent
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("decronym/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::connect("<client>", &e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn map_error(url: &str, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::timeout(url)
        } else {
            TransportError::connect(url, &error.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        timeout: Duration,
        auth: Option<&Credentials>,
    ) -> Result<HttpResponse, TransportError> {
        debug!("GET {url}");
        let mut request = self.client.get(url).timeout(timeout);
        if let Some(credentials) = auth {
            request = request.basic_auth(
                &credentials.username,
                Some(credentials.password.expose_secret()),
            );
        }

        let response = request
            .send()
            .await
            .map_err(|e| Self::map_error(url, e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::timeout(url)
            } else {
                TransportError::body(url, &e.to_string())
            }
        })?;

        trace!("GET {url} -> {status} ({} bytes)", body.len());
        Ok(HttpResponse { status, body })
    }

    async fn head(&self, url: &str, timeout: Duration) -> Result<u16, TransportError> {
        debug!("HEAD {url}");
        let response = self
            .client
            .head(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Self::map_error(url, e))?;
        Ok(response.status().as_u16())
    }
}
