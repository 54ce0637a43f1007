//! Scripted HTTP transport for testing network providers

use async_trait::async_trait;
use decronym_core::credentials::Credentials;
use decronym_core::error::TransportError;
use decronym_core::transport::{HttpResponse, HttpTransport};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock implementation of [`HttpTransport`]
///
/// Responses are scripted per URL; anything unscripted answers 404. Every
/// call is recorded so tests can assert how often the network was touched.
///
/// # Examples
///
/// ```rust,no_run
/// use decronym_test_utils::MockTransport;
///
/// let transport = MockTransport::new();
/// transport.respond_ok("https://example.com/defs.json", r#"{"defs": []}"#);
/// assert_eq!(transport.get_count(), 0);
/// ```
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    routes: HashMap<String, MockReply>,
    gets: Vec<RecordedCall>,
    heads: Vec<String>,
}

#[derive(Clone)]
enum MockReply {
    Response(HttpResponse),
    Error(TransportError),
}

/// One GET the mock received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub url: String,
    pub timeout: Duration,
    /// Basic-auth user name sent with the request
    pub username: Option<String>,
}

impl MockTransport {
    /// Create a mock that answers 404 to everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a response for `url`
    pub fn respond(&self, url: &str, status: u16, body: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .routes
            .insert(url.to_string(), MockReply::Response(HttpResponse::new(status, body)));
        self
    }

    /// Script a 200 response for `url`
    pub fn respond_ok(&self, url: &str, body: &str) -> &Self {
        self.respond(url, 200, body)
    }

    /// Make every request to `url` fail at the transport level
    pub fn fail(&self, url: &str, error: TransportError) -> &Self {
        self.state
            .lock()
            .unwrap()
            .routes
            .insert(url.to_string(), MockReply::Error(error));
        self
    }

    /// Make `url` unreachable
    pub fn refuse(&self, url: &str) -> &Self {
        self.fail(url, TransportError::connect(url, "connection refused"))
    }

    /// Number of GET requests received
    pub fn get_count(&self) -> usize {
        self.state.lock().unwrap().gets.len()
    }

    /// Number of HEAD requests received
    pub fn head_count(&self) -> usize {
        self.state.lock().unwrap().heads.len()
    }

    /// Number of requests of either method to `url`
    pub fn calls_to(&self, url: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.gets.iter().filter(|c| c.url == url).count()
            + state.heads.iter().filter(|u| *u == url).count()
    }

    /// Every GET received, in order
    pub fn gets(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().gets.clone()
    }

    fn reply(&self, url: &str) -> MockReply {
        self.state
            .lock()
            .unwrap()
            .routes
            .get(url)
            .cloned()
            .unwrap_or_else(|| MockReply::Response(HttpResponse::new(404, "Not Found")))
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(
        &self,
        url: &str,
        timeout: Duration,
        auth: Option<&Credentials>,
    ) -> Result<HttpResponse, TransportError> {
        self.state.lock().unwrap().gets.push(RecordedCall {
            url: url.to_string(),
            timeout,
            username: auth.map(|c| c.username.clone()),
        });

        match self.reply(url) {
            MockReply::Response(response) => Ok(response),
            MockReply::Error(error) => Err(error),
        }
    }

    async fn head(&self, url: &str, _timeout: Duration) -> Result<u16, TransportError> {
        self.state.lock().unwrap().heads.push(url.to_string());

        match self.reply(url) {
            MockReply::Response(response) => Ok(response.status),
            MockReply::Error(error) => Err(error),
        }
    }
}
