use serde::{Deserialize, Serialize};

use crate::error::AiError;

// =============================================================================
// Messages
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    User,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl WireMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

// =============================================================================
// Chat Request
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: 1024,
            messages: Vec::new(),
            system: None,
            temperature: None,
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn message(mut self, message: WireMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

// =============================================================================
// Chat Response
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl ChatResponse {
    /// The answer text. Replies cut off at `max_tokens` are an error.
    pub fn into_text(self) -> Result<String, AiError> {
        if self.stop_reason.as_deref() == Some("max_tokens") {
            return Err(AiError::Truncated);
        }
        self.text().ok_or(AiError::EmptyResponse)
    }

    pub fn text(&self) -> Option<String> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.clone()),
            ContentBlock::Other => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_unset_optional_fields() {
        let request = ChatRequest::new("claude-haiku-4-5").message(WireMessage::user("hi"));
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("system").is_none());
        assert!(json.get("temperature").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn response_text_skips_non_text_blocks() {
        let raw = r#"{"content":[{"type":"tool_use","id":"x","name":"n","input":{}},{"type":"text","text":"ok"}],"stop_reason":"end_turn"}"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.text().as_deref(), Some("ok"));
        assert_eq!(response.into_text().unwrap(), "ok");
    }

    #[test]
    fn max_tokens_stop_is_truncated() {
        let raw = r#"{"content":[{"type":"text","text":"{\"type\": \"str"}],"stop_reason":"max_tokens"}"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(response.into_text(), Err(AiError::Truncated)));

        let empty: ChatResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert!(matches!(empty.into_text(), Err(AiError::EmptyResponse)));
    }
}
