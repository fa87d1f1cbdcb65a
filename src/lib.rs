//! # Loop Agent
//!
//! A small, bounded agent loop: the model either answers with `DONE: ...` or
//! asks for one of a fixed set of tools, the tool runs, its result is folded
//! back into the conversation, and the loop repeats.
//!
//! ## Features
//!
//! - **Bounded loop**: every run ends with an answer or a typed error, never spins forever
//! - **Tool System**: single-argument tools behind a trait, case-insensitive lookup
//! - **Two integration modes**: JSON-schema tool use, or tools listed in the prompt
//! - **Anthropic Integration**: Built-in client for the Messages API
//! - **Cancellation and timeouts**: checked between turns, bounded per call
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use loop_agent::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads ANTHROPIC_API_KEY when no key is given
//!     let llm_client = LLMClientBuilder::new().build_anthropic()?;
//!
//!     let registry = Arc::new(ToolRegistry::from_tools([
//!         Arc::new(LookupTool::calendar()) as DynTool,
//!         Arc::new(LookupTool::email()) as DynTool,
//!     ])?);
//!
//!     let agent = Agent::with_defaults(llm_client, registry);
//!     let result = agent.run("What is alice up to today?").await?;
//!
//!     println!("{}", result.answer);
//!     for step in &result.steps {
//!         println!("{} -> {}", step.tool_name, step.output);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod error;
pub mod llm;
pub mod session;
pub mod tool;

// Re-exports for convenient usage
pub use agent::{
    Agent, AgentConfig, IntegrationMode, ParsedTurn, RunResult, SchemaMode, StepRecord,
    TextPromptMode, ToolInvocationRequest,
};
pub use error::AgentError;
pub use llm::{AnthropicClient, ContentBlock, LLMClient, LLMClientBuilder, LLMError, LLMInput, LLMOutput};
pub use session::{Message, MessageRole, Session, SessionStatus};
pub use tool::{DynTool, FnTool, LookupTool, Tool, ToolDefinition, ToolError, ToolRegistry, ToolResult};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::agent::{Agent, AgentConfig, RunResult, SchemaMode, TextPromptMode};
    pub use crate::error::AgentError;
    pub use crate::llm::{LLMClient, LLMClientBuilder};
    pub use crate::tool::{DynTool, FnTool, LookupTool, Tool, ToolError, ToolRegistry};
}
