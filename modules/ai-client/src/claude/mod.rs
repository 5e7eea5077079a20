mod client;
pub(crate) mod types;

use anyhow::{anyhow, Result};

use crate::error::AiError;
use client::ClaudeClient;
use types::*;

// =============================================================================
// Claude Agent
// =============================================================================

/// Text-completion handle for the Anthropic Messages API.
///
/// Cheap to clone; the underlying `reqwest::Client` pools connections.
#[derive(Clone)]
pub struct Claude {
    api_key: String,
    pub(crate) model: String,
    base_url: Option<String>,
    max_tokens: u32,
    http: reqwest::Client,
}

impl Claude {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            max_tokens: 4096,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Cap the completion length. Label-style prompts only need a few tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    fn client(&self) -> ClaudeClient {
        let client = ClaudeClient::new(&self.api_key, self.http.clone());
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    pub async fn chat_completion(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<String> {
        let request = ChatRequest::new(&self.model)
            .system(system)
            .message(WireMessage::user(user))
            .max_tokens(self.max_tokens)
            .temperature(0.0);

        let response = self.client().chat(&request).await?;

        response
            .text()
            .ok_or_else(|| anyhow!(AiError::EmptyResponse("Claude")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claude_new() {
        let ai = Claude::new("sk-ant-test", "claude-sonnet-4-20250514");
        assert_eq!(ai.model(), "claude-sonnet-4-20250514");
        assert_eq!(ai.api_key(), "sk-ant-test");
        assert_eq!(ai.max_tokens, 4096);
    }

    #[test]
    fn test_claude_with_base_url() {
        let ai = Claude::new("sk-ant-test", "claude-sonnet-4-20250514")
            .with_base_url("https://custom.api.com");
        assert_eq!(ai.base_url, Some("https://custom.api.com".to_string()));
    }

    #[test]
    fn test_claude_with_max_tokens() {
        let ai = Claude::new("sk-ant-test", "claude-sonnet-4-20250514").with_max_tokens(16);
        assert_eq!(ai.max_tokens, 16);
    }

    #[test]
    fn test_unreachable_endpoint_is_error() {
        let ai = Claude::new("sk-ant-test", "claude-sonnet-4-20250514")
            .with_base_url("http://127.0.0.1:1");
        let result = tokio_test::block_on(ai.chat_completion("Answer with one word.", "ping"));
        assert!(result.is_err());
    }
}
