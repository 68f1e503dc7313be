//! Page transport.

use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::instrument;

/// Retrieves the body of a page by URL.
///
/// An absent page (HTTP 404) is a normal outcome and returns `Ok(None)`, so
/// that callers can implement fallbacks without inspecting errors. Every
/// other failure is an error.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn get(&self, url: &str) -> Result<Option<String>>;
}

/// [`PageSource`] backed by a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
}
impl HttpPageSource {
    pub fn new(timeout: Duration, user_agent: impl AsRef<str>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent.as_ref())
            .build()
            .or_raise(|| ErrorKind::Client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    #[instrument(skip(self))]
    async fn get(&self, url: &str) -> Result<Option<String>> {
        let response = self.client.get(url).send().await.map_err(|e| ErrorKind::Network(e.to_string()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            exn::bail!(ErrorKind::Network(format!("HTTP {status} for {url}")));
        }
        let body = response.text().await.map_err(|e| ErrorKind::Network(e.to_string()))?;
        Ok(Some(body))
    }
}
