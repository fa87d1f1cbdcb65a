//! How tools are advertised to the backend and how its replies are read.

use serde_json::Value;

use super::parse::{ParsedTurn, ToolInvocationRequest, parse_completion, parse_tool_name};
use crate::llm::LLMOutput;
use crate::tool::{ToolDefinition, ToolRegistry};

/// An integration strategy: a capability formatter paired with a response
/// interpreter.
pub trait IntegrationMode: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// System prompt sent with every request, empty for none.
    fn system_prompt(&self, registry: &ToolRegistry) -> String;

    /// Tool schemas sent with every request, empty for none.
    fn tool_definitions(&self, registry: &ToolRegistry) -> Vec<ToolDefinition>;

    /// Classifies one model turn.
    fn interpret(&self, output: &LLMOutput, registry: &ToolRegistry, query: &str) -> ParsedTurn;
}

/// Tools are sent as JSON schemas and requested through structured tool-use
/// blocks carrying named arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaMode;

impl IntegrationMode for SchemaMode {
    fn name(&self) -> &'static str {
        "schema"
    }

    fn system_prompt(&self, _registry: &ToolRegistry) -> String {
        String::new()
    }

    fn tool_definitions(&self, registry: &ToolRegistry) -> Vec<ToolDefinition> {
        registry.to_tool_definitions()
    }

    fn interpret(&self, output: &LLMOutput, registry: &ToolRegistry, _query: &str) -> ParsedTurn {
        if let Some(answer) = output.first_text().and_then(parse_completion) {
            return ParsedTurn::Completion(answer);
        }

        let requests: Vec<ToolInvocationRequest> = output
            .tool_uses()
            .map(|(name, input)| {
                let argument = match registry.resolve(name) {
                    Some(tool) => input
                        .get(tool.argument_name())
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    None => first_string(input),
                };
                ToolInvocationRequest::new(name, argument)
            })
            .collect();

        if requests.is_empty() {
            ParsedTurn::Unparseable
        } else {
            ParsedTurn::ToolRequests(requests)
        }
    }
}

fn first_string(input: &Value) -> Option<String> {
    input
        .as_object()?
        .values()
        .find_map(Value::as_str)
        .map(str::to_string)
}

/// Tools are listed in the system prompt; the model replies with a bare tool
/// name and the tool receives the whole query.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextPromptMode;

impl IntegrationMode for TextPromptMode {
    fn name(&self) -> &'static str {
        "text"
    }

    fn system_prompt(&self, registry: &ToolRegistry) -> String {
        format!(
            "You are an agent helping answer a user query.\n\
             Available tools:\n{}\n\n\
             If you have enough information to answer the query, respond with: DONE: [final answer]\n\
             Otherwise, respond with the name of the next tool to use (just the tool name).",
            registry.describe_text()
        )
    }

    fn tool_definitions(&self, _registry: &ToolRegistry) -> Vec<ToolDefinition> {
        Vec::new()
    }

    fn interpret(&self, output: &LLMOutput, _registry: &ToolRegistry, query: &str) -> ParsedTurn {
        // Free-form replies often open with a blank line.
        let text = output.joined_text();
        if let Some(answer) = parse_completion(text.trim_start()) {
            return ParsedTurn::Completion(answer);
        }

        match parse_tool_name(&text) {
            Some(name) => {
                ParsedTurn::ToolRequests(vec![ToolInvocationRequest::new(name, Some(query.to_string()))])
            }
            None => ParsedTurn::Unparseable,
        }
    }
}
