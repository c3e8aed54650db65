//! Web search used by the resolver's second text fallback.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::traits::{WebHit, WebSearcher};

const SERPAPI_URL: &str = "https://serpapi.com/search.json";
const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    link: String,
    #[serde(default)]
    title: String,
}

pub struct SerpSearcher {
    http: reqwest::Client,
    api_key: String,
}

impl SerpSearcher {
    pub fn new(api_key: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            http,
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl WebSearcher for SerpSearcher {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<WebHit>> {
        debug!(query, "Web search");
        let num = max_results.to_string();
        let resp = self
            .http
            .get(SERPAPI_URL)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("num", num.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Search API returned status {status}");
        }

        let body: SerpResponse = resp.json().await?;
        Ok(body
            .organic_results
            .into_iter()
            .take(max_results as usize)
            .map(|r| WebHit {
                url: r.link,
                title: r.title,
            })
            .collect())
    }
}

/// Stands in when no search API key is configured: the resolver skips
/// straight from catalog search to product synthesis.
pub struct NoopSearcher;

#[async_trait]
impl WebSearcher for NoopSearcher {
    async fn search(&self, _query: &str, _max_results: u32) -> Result<Vec<WebHit>> {
        Ok(Vec::new())
    }
}
