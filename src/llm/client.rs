use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::anthropic::AnthropicClient;
use crate::error::AgentError;
use crate::session::Message;
use crate::tool::ToolDefinition;

/// Input for an LLM request.
#[derive(Debug, Clone)]
pub struct LLMInput {
    /// The model to use
    pub model: String,
    /// The messages to send
    pub messages: Vec<Message>,
    /// The system prompt, empty for none
    pub system_prompt: String,
    /// Tool schemas advertised to the model, empty for none
    pub tools: Vec<ToolDefinition>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Optional temperature (0.0 to 1.0)
    pub temperature: Option<f32>,
}

/// One block of model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Free text
    Text { text: String },
    /// A structured request to invoke a tool
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
}

/// Output from an LLM response.
#[derive(Debug, Clone)]
pub struct LLMOutput {
    /// The content of the response, in the order the model produced it
    pub content: Vec<ContentBlock>,
    /// The reason the response finished
    pub finish_reason: FinishReason,
    /// Token usage statistics
    pub usage: Usage,
}

impl LLMOutput {
    /// Builds a plain-text response.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            finish_reason: FinishReason::Stop,
            usage: Usage::default(),
        }
    }

    /// The first text block, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// All text blocks joined with newlines.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The tool-use blocks as `(name, input)` pairs.
    pub fn tool_uses(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.content.iter().filter_map(|block| match block {
            ContentBlock::ToolUse { name, input, .. } => Some((name.as_str(), input)),
            _ => None,
        })
    }
}

/// The reason the LLM finished generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop point reached
    Stop,
    /// Stopped due to tool calls
    ToolCalls,
    /// Maximum tokens reached
    MaxTokens,
    /// Anything else the backend reported
    Error,
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Number of input tokens
    pub input_tokens: u32,
    /// Number of output tokens
    pub output_tokens: u32,
}

/// Errors that can occur when communicating with an LLM.
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    /// An API error occurred
    #[error("API error: {0}")]
    ApiError(String),
    /// A network error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    /// The response from the LLM was invalid
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthError(String),
    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitError(String),
    /// The request did not complete in time
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Trait for LLM clients.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Sends a request and returns a complete response.
    async fn complete(&self, input: LLMInput) -> Result<LLMOutput, LLMError>;
}

/// Environment variable consulted when no API key is given explicitly.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// A builder for creating LLM clients.
#[derive(Debug, Default)]
pub struct LLMClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<std::time::Duration>,
}

impl LLMClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the timeout.
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Creates an Anthropic client, reading the key from the environment if
    /// none was set.
    pub fn build_anthropic(self) -> Result<Arc<dyn LLMClient>, AgentError> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AgentError::Configuration(format!("{} is not set", API_KEY_ENV)))?;

        Ok(Arc::new(AnthropicClient::new(
            api_key,
            self.base_url,
            self.timeout,
        )?))
    }
}
