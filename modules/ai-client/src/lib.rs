mod client;
pub mod schema;
mod types;
pub mod util;

use anyhow::{anyhow, Result};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use client::ClaudeClient;
use schema::tool_schema;
use types::{ChatRequest, ImageSource, ToolDefinitionWire, WireMessage};

/// Anthropic Messages API agent, cheap to clone, safe to share.
#[derive(Clone)]
pub struct Claude {
    api_key: String,
    model: String,
    base_url: Option<String>,
}

impl Claude {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow!("ANTHROPIC_API_KEY environment variable not set"))?;
        Ok(Self::new(api_key, model))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> ClaudeClient {
        let client = ClaudeClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    fn structured_tool<T: JsonSchema>() -> ToolDefinitionWire {
        ToolDefinitionWire {
            name: "structured_response".to_string(),
            description: "Return the structured result.".to_string(),
            input_schema: tool_schema::<T>(),
        }
    }

    /// Plain text completion at temperature 0.
    pub async fn complete(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<String> {
        let request = ChatRequest::new(&self.model)
            .system(system)
            .message(WireMessage::user(user))
            .temperature(0.0);

        let response = self.client().chat(&request).await?;
        response
            .text()
            .ok_or_else(|| anyhow!("No text response from Claude"))
    }

    /// Schema-constrained extraction via a forced tool call.
    pub async fn extract<T: JsonSchema + DeserializeOwned>(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<T> {
        self.extract_metered(system, user).await.map(|(v, _)| v)
    }

    /// Like [`extract`](Self::extract), additionally reporting total tokens
    /// consumed so callers can account for spend per run.
    pub async fn extract_metered<T: JsonSchema + DeserializeOwned>(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<(T, u32)> {
        let request = ChatRequest::new(&self.model)
            .system(system)
            .message(WireMessage::user(user))
            .temperature(0.0)
            .forced_tool(Self::structured_tool::<T>());

        let response = self.client().chat(&request).await?;
        let tokens = response.total_tokens();
        let input = response
            .tool_input()
            .ok_or_else(|| anyhow!("No structured output in Claude response"))?;
        let value = serde_json::from_value(input.clone())
            .map_err(|e| anyhow!("Failed to deserialize response: {}", e))?;
        Ok((value, tokens))
    }

    /// Schema-constrained extraction from a base64 image (vision).
    pub async fn extract_from_image<T: JsonSchema + DeserializeOwned>(
        &self,
        image_base64: &str,
        media_type: &str,
        system: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Result<(T, u32)> {
        let source = ImageSource {
            source_type: "base64".to_string(),
            media_type: media_type.to_string(),
            data: image_base64.to_string(),
        };

        let request = ChatRequest::new(&self.model)
            .system(system)
            .message(WireMessage::user_with_image(source, prompt))
            .temperature(0.0)
            .forced_tool(Self::structured_tool::<T>());

        let response = self.client().chat(&request).await?;
        let tokens = response.total_tokens();
        let input = response
            .tool_input()
            .ok_or_else(|| anyhow!("No structured output in Claude vision response"))?;
        let value = serde_json::from_value(input.clone())
            .map_err(|e| anyhow!("Failed to deserialize vision response: {}", e))?;
        Ok((value, tokens))
    }
}
