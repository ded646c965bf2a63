//! HTTP client for catalog requests using wreq browser emulation.

use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use wreq::Client;
use wreq_util::Emulation;

/// A fetched page.
#[derive(Debug, Clone)]
pub struct Page {
    /// Final URL after redirects
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

/// A request that came back with a non-success status.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request to {url} failed with status: {status}")]
    Status { url: String, status: u16 },
}

/// Trait for page fetching - enables mocking for tests.
#[async_trait]
pub trait CatalogFetch: Send + Sync {
    /// Fetches `url`. Non-success statuses are errors.
    async fn get(&self, url: &str) -> Result<Page>;

    /// Returns the site root that search URLs are built on.
    fn base_url(&self) -> &str;
}

/// Catalog HTTP client with browser impersonation.
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    /// Creates a new client with the given configuration.
    pub async fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        // Configure proxy if specified
        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self { client, base_url: config.base_url.clone() })
    }
}

#[async_trait]
impl CatalogFetch for CatalogClient {
    async fn get(&self, url: &str) -> Result<Page> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Referer", self.base_url.as_str())
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let status = response.status();
        let final_url = response.uri().to_string();

        if status == 503 {
            warn!("Rate limited (503). Consider using a proxy or increasing --sleep.");
        }

        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() }.into());
        }

        let body = response.text().await.context("Failed to read response body")?;
        debug!("GET {} -> {}, bytes={}", url, status, body.len());

        Ok(Page { url: final_url, status: status.as_u16(), body })
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
