mod client;
pub(crate) mod types;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AiError;
use crate::traits::ContentGenerator;
use client::ClaudeClient;
use types::*;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const EXTRACTION_SYSTEM_PROMPT: &str = "You extract structured supply-chain disruption data. \
Answer with exactly one JSON object or the literal null. Never add commentary.";

// =============================================================================
// Claude Agent
// =============================================================================

#[derive(Clone)]
pub struct Claude {
    api_key: String,
    pub(crate) model: String,
    base_url: Option<String>,
    timeout: Duration,
}

impl Claude {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> Result<ClaudeClient, AiError> {
        let client = ClaudeClient::new(&self.api_key, self.timeout)?;
        Ok(match self.base_url {
            Some(ref url) => client.with_base_url(url),
            None => client,
        })
    }

    pub async fn chat_completion(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<String, AiError> {
        let request = ChatRequest::new(&self.model)
            .system(system)
            .message(WireMessage::user(user))
            .max_tokens(1024)
            .temperature(0.0);

        let response = self.client()?.chat(&request).await?;

        response.into_text()
    }
}

// =============================================================================
// ContentGenerator Implementation
// =============================================================================

#[async_trait]
impl ContentGenerator for Claude {
    fn name(&self) -> &str {
        "claude"
    }

    async fn generate_content(&self, prompt: &str) -> Result<String, AiError> {
        self.chat_completion(EXTRACTION_SYSTEM_PROMPT, prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claude_new() {
        let ai = Claude::new("sk-ant-test", "claude-haiku-4-5-20251001");
        assert_eq!(ai.model(), "claude-haiku-4-5-20251001");
        assert_eq!(ai.api_key, "sk-ant-test");
        assert_eq!(ai.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_claude_with_base_url() {
        let ai = Claude::new("sk-ant-test", "claude-haiku-4-5-20251001")
            .with_base_url("https://custom.api.com");
        assert_eq!(ai.base_url, Some("https://custom.api.com".to_string()));
    }

    #[tokio::test]
    async fn unreachable_endpoint_surfaces_network_error() {
        let ai = Claude::new("sk-ant-test", "claude-haiku-4-5-20251001")
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_millis(500));
        let err = ai.generate_content("ping").await.unwrap_err();
        assert!(matches!(err, AiError::Network(_)));
    }
}
