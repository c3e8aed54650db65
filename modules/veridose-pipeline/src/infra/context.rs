//! HTTP [`ContextProvider`] against the internal user-context service.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use veridose_common::UserHealthContext;

use crate::traits::ContextProvider;

const CONTEXT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpContextProvider {
    http: reqwest::Client,
    base_url: String,
}

impl HttpContextProvider {
    pub fn new(base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(CONTEXT_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ContextProvider for HttpContextProvider {
    async fn full_context(&self, user_id: &str) -> Result<UserHealthContext> {
        let url = format!("{}/users/{}/context", self.base_url, user_id);
        debug!(user_id, "Fetching user health context");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Context service request for user {user_id} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Context service returned status {status} for user {user_id}");
        }

        Ok(resp.json().await?)
    }
}
