//! HTTP client for the public customer-reviews feed.

use crate::appstore::storefronts::Storefront;
use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; app-review-scraper)";

/// A failure that ends pagination for one storefront.
///
/// Recovered at the run level: the storefront keeps whatever it collected
/// before the failure, and the remaining storefronts still run.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed feed document: {0}")]
    Document(#[from] serde_json::Error),
}

/// Trait for fetching feed pages - enables mocking for tests.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetches one feed page body.
    ///
    /// `Ok(None)` means the upstream answered with a non-success status: the
    /// app is not distributed in this storefront (or the feed ran out), which
    /// is the normal end of that storefront, not an error.
    async fn page(
        &self,
        app_id: &str,
        storefront: Storefront,
        page: u32,
    ) -> Result<Option<String>, FeedError>;
}

/// Feed HTTP client with fixed timeouts and an optional proxy.
pub struct FeedClient {
    client: Client,
    base_url: Option<String>,
}

impl FeedClient {
    /// Creates a new feed client from the configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config, None)
    }

    /// Creates a new feed client with a custom base URL (for testing).
    pub fn with_base_url(config: &Config, base_url: Option<String>) -> Result<Self> {
        let mut builder = Client::builder()
            .gzip(true)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = reqwest::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }

    /// Returns the base URL (custom for testing, or the production endpoint).
    fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or("https://itunes.apple.com")
    }

    /// Builds the feed URL for one (app, storefront, page) triple.
    fn page_url(&self, app_id: &str, storefront: Storefront, page: u32) -> String {
        format!(
            "{}/{}/rss/customerreviews/page={}/sortby=mostrecent/id={}/json",
            self.base_url(),
            storefront.code_lower(),
            page,
            app_id
        )
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn page(
        &self,
        app_id: &str,
        storefront: Storefront,
        page: u32,
    ) -> Result<Option<String>, FeedError> {
        let url = self.page_url(app_id, storefront, page);
        debug!("GET {}", url);

        let response = self.client.get(&url).header("User-Agent", USER_AGENT).send().await?;

        let status = response.status();
        if !status.is_success() {
            // 404 here means the app is not available in this storefront.
            debug!("{}: status {} on page {}, storefront exhausted", storefront, status, page);
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }
}
