use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{ContentBlock, FinishReason, LLMClient, LLMError, LLMInput, LLMOutput, Usage};
use crate::error::AgentError;
use crate::tool::ToolDefinition;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolDefinition],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

fn no_tools(tools: &&[ToolDefinition]) -> bool {
    tools.is_empty()
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Messages API response body.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<WireBlock>,
    stop_reason: Option<String>,
    #[serde(default)]
    usage: WireUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
struct WireUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// An LLM client for Anthropic's Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    base_url: String,
}

impl AnthropicClient {
    /// Creates a new Anthropic client.
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, AgentError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "x-api-key",
            reqwest::header::HeaderValue::from_str(&api_key)
                .map_err(|e| AgentError::Configuration(format!("invalid API key: {}", e)))?,
        );
        headers.insert(
            "anthropic-version",
            reqwest::header::HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let mut client_builder = reqwest::Client::builder().default_headers(headers);

        if let Some(timeout) = timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder
            .build()
            .map_err(|e| AgentError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn build_request(input: &LLMInput) -> MessagesRequest<'_> {
        MessagesRequest {
            model: &input.model,
            max_tokens: input.max_tokens,
            system: Some(input.system_prompt.as_str()).filter(|s| !s.is_empty()),
            messages: input
                .messages
                .iter()
                .map(|msg| WireMessage {
                    role: msg.role.as_str(),
                    content: &msg.content,
                })
                .collect(),
            tools: &input.tools,
            temperature: input.temperature,
        }
    }

    fn parse_response(body: &str) -> Result<LLMOutput, LLMError> {
        let response: MessagesResponse = serde_json::from_str(body)
            .map_err(|e| LLMError::InvalidResponse(format!("{}: {}", e, body)))?;

        let content = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                WireBlock::Text { text } => Some(ContentBlock::Text { text }),
                WireBlock::ToolUse { id, name, input } => {
                    Some(ContentBlock::ToolUse { id, name, input })
                }
                WireBlock::Other => None,
            })
            .collect();

        let finish_reason = match response.stop_reason.as_deref() {
            Some("end_turn") | Some("stop_sequence") => FinishReason::Stop,
            Some("tool_use") => FinishReason::ToolCalls,
            Some("max_tokens") => FinishReason::MaxTokens,
            _ => FinishReason::Error,
        };

        Ok(LLMOutput {
            content,
            finish_reason,
            usage: Usage {
                input_tokens: response.usage.input_tokens,
                output_tokens: response.usage.output_tokens,
            },
        })
    }

    fn status_error(status: StatusCode, body: &str) -> LLMError {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LLMError::AuthError(message),
            StatusCode::TOO_MANY_REQUESTS => LLMError::RateLimitError(message),
            _ => LLMError::ApiError(format!("{}: {}", status, message)),
        }
    }
}

#[async_trait]
impl LLMClient for AnthropicClient {
    async fn complete(&self, input: LLMInput) -> Result<LLMOutput, LLMError> {
        let body = Self::build_request(&input);

        debug!(model = %input.model, messages = input.messages.len(), tools = input.tools.len(), "Sending request to Anthropic");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| LLMError::InvalidResponse(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::status_error(status, &response_text));
        }

        debug!("LLM response: {}", response_text);

        Self::parse_response(&response_text)
    }
}
