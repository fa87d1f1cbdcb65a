pub mod agent_loop;
pub mod mode;
pub mod parse;

pub use agent_loop::{Agent, AgentConfig, RunResult, StepRecord};
pub use mode::{IntegrationMode, SchemaMode, TextPromptMode};
pub use parse::{COMPLETION_SENTINEL, ParsedTurn, ToolInvocationRequest, parse_completion};
