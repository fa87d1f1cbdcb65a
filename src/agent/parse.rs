//! Turning raw model text into control-flow decisions.

use regex::Regex;
use std::sync::LazyLock;

/// Prefix that marks the model's final answer.
pub const COMPLETION_SENTINEL: &str = "DONE:";

/// Appended after every dispatched tool.
pub const CONTINUE_PROMPT: &str =
    "Continue or respond with DONE: [answer] if we have enough information.";

/// Appended after a turn that dispatched nothing.
pub const REPROMPT: &str = "That was neither a final answer nor a usable tool request. \
Respond with DONE: [answer] if we have enough information, otherwise request one of the available tools.";

/// Stands in for an empty model turn so the conversation keeps alternating.
pub const EMPTY_TURN_PLACEHOLDER: &str = "(no response)";

static TOOL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[\s`*"']*([A-Za-z][\w-]*)[\s`*"'.]*$"#).expect("tool name pattern is valid")
});

/// A single request to run a tool, taken from one model turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocationRequest {
    pub tool_name: String,
    pub argument: Option<String>,
}

impl ToolInvocationRequest {
    pub fn new(tool_name: impl Into<String>, argument: Option<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            argument,
        }
    }

    /// The argument, unless it is missing or blank.
    pub fn usable_argument(&self) -> Option<&str> {
        self.argument.as_deref().filter(|arg| !arg.trim().is_empty())
    }
}

/// What a model turn asks the loop to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedTurn {
    /// Final answer, already trimmed and non-empty
    Completion(String),
    /// Tool requests in the order the model produced them
    ToolRequests(Vec<ToolInvocationRequest>),
    /// Nothing actionable
    Unparseable,
}

/// Extracts the answer from a completion signal.
///
/// The sentinel must open the text. A sentinel with nothing after it is
/// not a completion.
pub fn parse_completion(text: &str) -> Option<String> {
    let answer = text.strip_prefix(COMPLETION_SENTINEL)?.trim();
    if answer.is_empty() {
        None
    } else {
        Some(answer.to_string())
    }
}

/// Reads a bare tool name echoed back by the model, e.g. `calendar` or `` `email`. ``
pub fn parse_tool_name(text: &str) -> Option<String> {
    TOOL_NAME
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// First user turn of every run.
pub fn seed_prompt(query: &str) -> String {
    format!(
        "Help answer this query: {}\n\
         Respond with DONE: [answer] if no tools needed, we're looping, or no tools left to call for new info. \
         Be thorough and provide all answers you possibly can if there are multiple tools.",
        query
    )
}

/// Assistant turn recorded for a dispatched tool.
pub fn tool_summary(tool_name: &str, argument: &str, result: &str) -> String {
    format!(
        "I used {} for {} and got this result: {}",
        tool_name, argument, result
    )
}
