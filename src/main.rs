use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use loop_agent::prelude::*;
use loop_agent::IntegrationMode;

const PROMPT: &str = "What would you like to know? (or 'quit' to exit): ";

/// How tools are offered to the model.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Tools sent as JSON schemas, requested through tool-use blocks
    Schema,
    /// Tools listed in the prompt, requested by name
    Text,
}

impl Mode {
    fn strategy(self) -> Arc<dyn IntegrationMode> {
        match self {
            Mode::Schema => Arc::new(SchemaMode),
            Mode::Text => Arc::new(TextPromptMode),
        }
    }
}

/// Ask questions about people's calendars and inboxes.
#[derive(Debug, Parser)]
#[command(name = "loop-agent", version, about)]
struct Cli {
    /// Integration mode
    #[arg(long, value_enum, default_value_t = Mode::Schema)]
    mode: Mode,

    /// Model identifier
    #[arg(long)]
    model: Option<String>,

    /// Maximum model calls per question
    #[arg(long)]
    max_steps: Option<usize>,

    /// Maximum tokens per model call
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Override the API base URL
    #[arg(long, env = "ANTHROPIC_BASE_URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds, applied to model and tool calls
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print the tools used for each answer
    #[arg(long)]
    trace: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let timeout = cli.timeout_secs.map(Duration::from_secs);

    let mut builder = LLMClientBuilder::new();
    if let Some(url) = cli.base_url.clone() {
        builder = builder.with_base_url(url);
    }
    if let Some(timeout) = timeout {
        builder = builder.with_timeout(timeout);
    }
    let llm_client = builder.build_anthropic().context("failed to set up the model client")?;

    let registry = Arc::new(ToolRegistry::from_tools([
        Arc::new(LookupTool::calendar()) as DynTool,
        Arc::new(LookupTool::email()) as DynTool,
    ])?);

    let defaults = AgentConfig::default();
    let config = AgentConfig {
        model: cli.model.unwrap_or(defaults.model),
        max_steps: cli.max_steps.unwrap_or(defaults.max_steps),
        max_tokens: cli.max_tokens.unwrap_or(defaults.max_tokens),
        temperature: defaults.temperature,
        backend_timeout: timeout,
        tool_timeout: timeout,
    };

    let agent = Agent::new(llm_client, registry, cli.mode.strategy(), config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(PROMPT.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query.eq_ignore_ascii_case("quit") {
            break;
        }
        if query.is_empty() {
            continue;
        }

        match agent.run(query).await {
            Ok(result) => {
                println!("{}", result.answer);
                if cli.trace {
                    for step in &result.steps {
                        let marker = if step.is_error { " (failed)" } else { "" };
                        println!("  - {}({}){}: {}", step.tool_name, step.argument, marker, step.output);
                    }
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    Ok(())
}
