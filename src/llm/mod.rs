pub mod anthropic;
pub mod client;

pub use anthropic::AnthropicClient;
pub use client::{
    API_KEY_ENV, ContentBlock, FinishReason, LLMClient, LLMClientBuilder, LLMError, LLMInput,
    LLMOutput, Usage,
};

#[cfg(test)]
pub use client::MockLLMClient;
