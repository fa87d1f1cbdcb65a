use std::fmt;

use serde::Serialize;

use crate::tool::{DynTool, ToolDefinition, ToolError};

/// Name and description of a registered tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescription {
    pub name: String,
    pub description: String,
}

/// An ordered, case-insensitively keyed set of tools available to the agent.
///
/// The agent only ever sees the registry through a shared reference, so it is
/// fixed for the duration of a run.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<DynTool>,
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

impl ToolRegistry {
    /// Creates a new empty tool registry.
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Builds a registry from a list of tools, keeping their order.
    pub fn from_tools(tools: impl IntoIterator<Item = DynTool>) -> Result<Self, ToolError> {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// Registers a tool with the registry.
    pub fn register(&mut self, tool: DynTool) -> Result<(), ToolError> {
        if self.resolve(tool.name()).is_some() {
            return Err(ToolError::DuplicateName(tool.name().to_string()));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Looks a tool up by name, ignoring case.
    pub fn resolve(&self, name: &str) -> Option<&DynTool> {
        self.tools.iter().find(|tool| same_name(tool.name(), name))
    }

    /// Names and descriptions of every tool, in registration order.
    pub fn describe_all(&self) -> Vec<ToolDescription> {
        self.tools
            .iter()
            .map(|tool| ToolDescription {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
            })
            .collect()
    }

    /// Renders the tools as a bulleted list for embedding in a prompt.
    pub fn describe_text(&self) -> String {
        self.describe_all()
            .iter()
            .map(|d| format!("- {}: {}", d.name, d.description))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Converts all tools to their definitions.
    pub fn to_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.to_definition()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    /// Returns the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
