//! Error types for the loop-agent library.

use thiserror::Error;

use crate::agent::StepRecord;

/// Unified error type for a run of the agent.
///
/// Tool failures never show up here: they are folded back into the
/// conversation so the model can react to them.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Missing or invalid credentials, or a client that could not be built
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The model backend failed (network, auth, rate limit, bad response, timeout)
    #[error("Backend error: {0}")]
    Backend(#[from] crate::llm::LLMError),

    /// The turn ceiling was reached without a completion signal
    #[error("No termination after {max_steps} steps")]
    TerminationBudgetExceeded {
        max_steps: usize,
        /// Tools that ran before the ceiling was hit
        steps: Vec<StepRecord>,
    },

    /// The caller cancelled the run between turns
    #[error("Run cancelled after {} tool calls", steps.len())]
    Cancelled { steps: Vec<StepRecord> },
}

impl AgentError {
    /// Tool invocations performed before the run stopped.
    ///
    /// Empty for configuration and backend errors.
    pub fn steps(&self) -> &[StepRecord] {
        match self {
            Self::TerminationBudgetExceeded { steps, .. } | Self::Cancelled { steps } => steps,
            Self::Configuration(_) | Self::Backend(_) => &[],
        }
    }
}
