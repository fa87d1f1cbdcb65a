use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::tool::{DynTool, ToolError, ToolRegistry, ToolResult};

/// Runs tools from a registry, turning every failure into a [`ToolResult`].
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    timeout: Option<Duration>,
}

impl ToolExecutor {
    /// Creates a new tool executor with the given registry.
    pub fn new(registry: Arc<ToolRegistry>, timeout: Option<Duration>) -> Self {
        Self { registry, timeout }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Executes a single tool call.
    ///
    /// Errors and timeouts are captured so the caller can fold them into the
    /// conversation instead of aborting.
    pub async fn execute(&self, tool: &DynTool, argument: &str) -> ToolResult {
        debug!(tool = tool.name(), argument, "Executing tool");

        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, tool.execute(argument)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ToolError::Timeout(limit)),
            },
            None => tool.execute(argument).await,
        };

        match outcome {
            Ok(output) => ToolResult::ok(output),
            Err(error) => {
                warn!(tool = tool.name(), %error, "Tool execution failed");
                ToolResult::error(error.to_string())
            }
        }
    }
}
