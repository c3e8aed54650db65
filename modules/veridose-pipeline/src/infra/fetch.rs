//! Page fetchers for the resolver's URL path.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::traits::PageFetcher;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Direct GET of the target page.
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");
        Self { http }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, "Direct page fetch");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Fetch of {url} returned status {status}");
        }

        Ok(resp.text().await?)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Fetch through an outbound scraping proxy (`GET {proxy}?url=<target>`)
/// to avoid IP blocklisting by retail sites.
pub struct ProxyFetcher {
    http: reqwest::Client,
    proxy_url: String,
}

impl ProxyFetcher {
    pub fn new(proxy_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            http,
            proxy_url: proxy_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PageFetcher for ProxyFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, proxy = %self.proxy_url, "Proxied page fetch");
        let resp = self
            .http
            .get(&self.proxy_url)
            .query(&[("url", url)])
            .send()
            .await
            .with_context(|| format!("Proxy fetch of {url} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Proxy fetch of {url} returned status {status}");
        }

        Ok(resp.text().await?)
    }

    fn name(&self) -> &str {
        "proxy"
    }
}
