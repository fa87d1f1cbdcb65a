pub mod executor;
pub mod lookup;
pub mod registry;

pub use executor::ToolExecutor;
pub use lookup::LookupTool;
pub use registry::{ToolDescription, ToolRegistry};
pub use tool_trait::{DynTool, FnTool, Tool};
pub use tool_types::{ToolDefinition, ToolError, ToolResult};

mod tool_types {
    use serde::{Deserialize, Serialize};
    use serde_json::Value;

    /// Definition of a tool as advertised to a schema-aware backend.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ToolDefinition {
        /// The name of the tool
        pub name: String,
        /// A description of what the tool does
        pub description: String,
        /// JSON Schema for the tool's input parameters
        pub input_schema: Value,
    }

    /// The outcome of running a tool once.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ToolResult {
        /// The output from the tool
        pub output: String,
        /// Error message if the tool execution failed
        pub error: Option<String>,
    }

    impl ToolResult {
        /// Creates a successful result.
        pub fn ok(output: impl Into<String>) -> Self {
            Self {
                output: output.into(),
                error: None,
            }
        }

        /// Creates a result with an error.
        pub fn error(error: impl Into<String>) -> Self {
            Self {
                output: String::new(),
                error: Some(error.into()),
            }
        }

        pub fn is_error(&self) -> bool {
            self.error.is_some()
        }

        /// The text folded back into the conversation for this result.
        pub fn content(&self) -> String {
            match &self.error {
                Some(error) => format!("error: {}", error),
                None => self.output.clone(),
            }
        }
    }

    /// Errors that can occur when registering or executing a tool.
    #[derive(Debug, thiserror::Error)]
    pub enum ToolError {
        #[error("Invalid arguments: {0}")]
        InvalidArguments(String),
        #[error("Execution failed: {0}")]
        ExecutionFailed(String),
        #[error("Duplicate tool name: {0}")]
        DuplicateName(String),
        #[error("Timed out after {0:?}")]
        Timeout(std::time::Duration),
    }
}

mod tool_trait {
    use super::tool_types::{ToolDefinition, ToolError};
    use async_trait::async_trait;
    use serde_json::{Map, Value, json};
    use std::fmt;
    use std::sync::Arc;

    /// A named capability the agent can invoke with a single string argument.
    #[async_trait]
    pub trait Tool: Send + Sync {
        /// Returns the name of the tool.
        fn name(&self) -> &str;
        /// Returns a description of what the tool does.
        fn description(&self) -> &str;

        /// Name of the single required parameter in the tool's input schema.
        fn argument_name(&self) -> &str {
            "input"
        }

        /// Returns the JSON Schema for the tool's input parameters.
        fn parameters_schema(&self) -> Value {
            let mut properties = Map::new();
            properties.insert(
                self.argument_name().to_string(),
                json!({
                    "type": "string",
                    "description": format!("Input for the {} tool", self.name()),
                }),
            );
            json!({
                "type": "object",
                "properties": properties,
                "required": [self.argument_name()],
            })
        }

        /// Executes the tool with the given argument.
        async fn execute(&self, argument: &str) -> Result<String, ToolError>;

        /// Converts the tool to its definition.
        fn to_definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: self.name().to_string(),
                description: self.description().to_string(),
                input_schema: self.parameters_schema(),
            }
        }
    }

    /// A type alias for a dynamic tool reference.
    pub type DynTool = Arc<dyn Tool>;

    type Action = Arc<dyn Fn(&str) -> Result<String, ToolError> + Send + Sync>;

    /// A tool backed by a plain closure.
    ///
    /// The closure may block; it runs on tokio's blocking pool so a timeout
    /// around [`Tool::execute`] still fires.
    pub struct FnTool {
        name: String,
        description: String,
        argument_name: String,
        action: Action,
    }

    impl FnTool {
        pub fn new<F>(name: impl Into<String>, description: impl Into<String>, action: F) -> Self
        where
            F: Fn(&str) -> Result<String, ToolError> + Send + Sync + 'static,
        {
            Self {
                name: name.into(),
                description: description.into(),
                argument_name: "input".to_string(),
                action: Arc::new(action),
            }
        }

        /// Overrides the parameter name advertised in the input schema.
        pub fn with_argument_name(mut self, argument_name: impl Into<String>) -> Self {
            self.argument_name = argument_name.into();
            self
        }
    }

    impl fmt::Debug for FnTool {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FnTool")
                .field("name", &self.name)
                .field("argument_name", &self.argument_name)
                .finish()
        }
    }

    #[async_trait]
    impl Tool for FnTool {
        fn name(&self) -> &str {
            &self.name
        }

        fn description(&self) -> &str {
            &self.description
        }

        fn argument_name(&self) -> &str {
            &self.argument_name
        }

        async fn execute(&self, argument: &str) -> Result<String, ToolError> {
            let action = Arc::clone(&self.action);
            let argument = argument.to_string();
            tokio::task::spawn_blocking(move || action(&argument))
                .await
                .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schema_has_single_required_argument() {
        let tool = FnTool::new("echo", "Echoes input", |arg| Ok(arg.to_string()))
            .with_argument_name("text");
        let def = tool.to_definition();

        assert_eq!(def.name, "echo");
        assert_eq!(def.input_schema["type"], "object");
        assert_eq!(def.input_schema["required"][0], "text");
        assert_eq!(def.input_schema["properties"]["text"]["type"], "string");
    }

    #[tokio::test]
    async fn test_fn_tool_executes_closure() {
        let tool = FnTool::new("upper", "Uppercases", |arg| Ok(arg.to_uppercase()));
        assert_eq!(tool.execute("abc").await.unwrap(), "ABC");
    }

    #[tokio::test]
    async fn test_fn_tool_panic_becomes_execution_failure() {
        let tool = FnTool::new("explode", "Panics", |_| panic!("kaboom"));
        let err = tool.execute("x").await.unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed(_)));
    }

    #[test]
    fn test_tool_result_content() {
        assert_eq!(ToolResult::ok("fine").content(), "fine");
        let failed = ToolResult::error("boom");
        assert!(failed.is_error());
        assert_eq!(failed.content(), "error: boom");
    }
}
