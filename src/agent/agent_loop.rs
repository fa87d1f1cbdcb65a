use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::mode::{IntegrationMode, SchemaMode};
use super::parse::{
    CONTINUE_PROMPT, EMPTY_TURN_PLACEHOLDER, ParsedTurn, REPROMPT, ToolInvocationRequest,
    seed_prompt, tool_summary,
};
use crate::error::AgentError;
use crate::llm::{LLMClient, LLMError, LLMInput, LLMOutput};
use crate::session::{Message, Session};
use crate::tool::{ToolDefinition, ToolExecutor, ToolRegistry};

/// Configuration for the agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// The model to use
    pub model: String,
    /// Maximum number of backend calls before giving up
    pub max_steps: usize,
    /// Maximum tokens to generate per call
    pub max_tokens: u32,
    /// Optional temperature
    pub temperature: Option<f32>,
    /// Upper bound for a single backend call
    pub backend_timeout: Option<Duration>,
    /// Upper bound for a single tool call
    pub tool_timeout: Option<Duration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-5-haiku-20241022".to_string(),
            max_steps: 20,
            max_tokens: 1024,
            temperature: Some(0.0),
            backend_timeout: None,
            tool_timeout: None,
        }
    }
}

/// One tool invocation performed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// Registered name of the tool that ran
    pub tool_name: String,
    pub argument: String,
    /// Tool output, or the error text when `is_error` is set
    pub output: String,
    pub is_error: bool,
}

/// The outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Text after the completion sentinel, trimmed
    pub answer: String,
    /// Every tool invocation, in dispatch order
    pub steps: Vec<StepRecord>,
    /// Conversation length when the run completed
    pub turns: usize,
}

impl RunResult {
    /// Tool outputs accumulated over the run, one per line.
    pub fn tool_outputs(&self) -> String {
        self.steps
            .iter()
            .map(|step| step.output.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The agent that answers a query by looping between the model and tools.
#[derive(Clone)]
pub struct Agent {
    llm_client: Arc<dyn LLMClient>,
    tool_executor: ToolExecutor,
    mode: Arc<dyn IntegrationMode>,
    config: AgentConfig,
}

impl Agent {
    /// Creates a new agent.
    pub fn new(
        llm_client: Arc<dyn LLMClient>,
        registry: Arc<ToolRegistry>,
        mode: Arc<dyn IntegrationMode>,
        config: AgentConfig,
    ) -> Self {
        let tool_executor = ToolExecutor::new(registry, config.tool_timeout);
        Self {
            llm_client,
            tool_executor,
            mode,
            config,
        }
    }

    /// Creates a schema-driven agent with default configuration.
    pub fn with_defaults(llm_client: Arc<dyn LLMClient>, registry: Arc<ToolRegistry>) -> Self {
        Self::new(llm_client, registry, Arc::new(SchemaMode), AgentConfig::default())
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.tool_executor.registry()
    }

    /// Answers `query`, running until the model signals completion.
    pub async fn run(&self, query: &str) -> Result<RunResult, AgentError> {
        self.run_with_cancel(query, CancellationToken::new()).await
    }

    /// Like [`Agent::run`], but stops between turns once `cancel` fires.
    ///
    /// A tool that is already running is always allowed to finish.
    pub async fn run_with_cancel(
        &self,
        query: &str,
        cancel: CancellationToken,
    ) -> Result<RunResult, AgentError> {
        let registry = self.tool_executor.registry();
        let system_prompt = self.mode.system_prompt(registry);
        let tool_defs = self.mode.tool_definitions(registry);
        debug!(mode = self.mode.name(), tools = registry.len(), "Starting run");

        let mut session = Session::seeded(Message::new_user(seed_prompt(query)));
        let mut steps = Vec::new();

        for step in 1..=self.config.max_steps {
            if cancel.is_cancelled() {
                info!(step, session = %session.id, "Run cancelled");
                return Err(AgentError::Cancelled { steps });
            }

            debug!(step, turns = session.message_count(), "Calling LLM");
            let output = self.call_backend(&session, &system_prompt, &tool_defs).await?;

            let dispatched = match self.mode.interpret(&output, registry, query) {
                ParsedTurn::Completion(answer) => {
                    session.finish();
                    info!(
                        step,
                        tool_calls = steps.len(),
                        elapsed_ms = session.elapsed().num_milliseconds(),
                        "Run completed"
                    );
                    return Ok(RunResult {
                        answer,
                        steps,
                        turns: session.message_count(),
                    });
                }
                ParsedTurn::ToolRequests(requests) => {
                    debug!(count = requests.len(), "Dispatching tool requests");
                    let mut dispatched = 0;
                    for request in &requests {
                        if self.dispatch(request, &mut session, &mut steps).await {
                            dispatched += 1;
                        }
                    }
                    dispatched
                }
                ParsedTurn::Unparseable => 0,
            };

            if dispatched == 0 {
                debug!(step, "Nothing actionable, re-prompting");
                let text = output.joined_text();
                let text = text.trim();
                session.push(Message::new_assistant(if text.is_empty() {
                    EMPTY_TURN_PLACEHOLDER
                } else {
                    text
                }));
                session.push(Message::new_user(REPROMPT));
            }
        }

        warn!(
            max_steps = self.config.max_steps,
            session = %session.id,
            elapsed_ms = session.elapsed().num_milliseconds(),
            "No completion signal"
        );
        Err(AgentError::TerminationBudgetExceeded {
            max_steps: self.config.max_steps,
            steps,
        })
    }

    async fn call_backend(
        &self,
        session: &Session,
        system_prompt: &str,
        tools: &[ToolDefinition],
    ) -> Result<LLMOutput, AgentError> {
        let input = LLMInput {
            model: self.config.model.clone(),
            messages: session.messages().to_vec(),
            system_prompt: system_prompt.to_string(),
            tools: tools.to_vec(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let output = match self.config.backend_timeout {
            Some(limit) => tokio::time::timeout(limit, self.llm_client.complete(input))
                .await
                .map_err(|_| LLMError::Timeout(limit))??,
            None => self.llm_client.complete(input).await?,
        };

        debug!(
            finish_reason = ?output.finish_reason,
            input_tokens = output.usage.input_tokens,
            output_tokens = output.usage.output_tokens,
            "LLM responded"
        );
        Ok(output)
    }

    /// Runs one tool request. Returns `false`, leaving the session untouched,
    /// when the request has no usable argument or names an unknown tool.
    async fn dispatch(
        &self,
        request: &ToolInvocationRequest,
        session: &mut Session,
        steps: &mut Vec<StepRecord>,
    ) -> bool {
        let Some(argument) = request.usable_argument() else {
            debug!(tool = %request.tool_name, "Skipping request without argument");
            return false;
        };

        let Some(tool) = self.tool_executor.registry().resolve(&request.tool_name) else {
            debug!(tool = %request.tool_name, "Skipping unknown tool");
            return false;
        };

        let result = self.tool_executor.execute(tool, argument).await;
        let content = result.content();

        session.push(Message::new_assistant(tool_summary(tool.name(), argument, &content)));
        session.push(Message::new_user(CONTINUE_PROMPT));
        steps.push(StepRecord {
            tool_name: tool.name().to_string(),
            argument: argument.to_string(),
            output: content,
            is_error: result.is_error(),
        });
        true
    }
}
