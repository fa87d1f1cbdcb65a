use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use loop_agent::llm::{FinishReason, Usage};
use loop_agent::prelude::*;
use loop_agent::{ContentBlock, LLMError, LLMInput, LLMOutput, MessageRole};

/// Replays a fixed list of responses and records every request it sees.
/// Once the script runs out, the last response is repeated.
struct ScriptedClient {
    script: Mutex<VecDeque<LLMOutput>>,
    last: Mutex<Option<LLMOutput>>,
    requests: Mutex<Vec<LLMInput>>,
}

impl ScriptedClient {
    fn new(script: Vec<LLMOutput>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<LLMInput> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMClient for ScriptedClient {
    async fn complete(&self, input: LLMInput) -> Result<LLMOutput, LLMError> {
        self.requests.lock().unwrap().push(input);
        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(output) => {
                *last = Some(output.clone());
                Ok(output)
            }
            None => last
                .clone()
                .ok_or_else(|| LLMError::InvalidResponse("empty script".to_string())),
        }
    }
}

fn tool_call(name: &str, person: &str) -> LLMOutput {
    LLMOutput {
        content: vec![ContentBlock::ToolUse {
            id: format!("toolu_{}_{}", name, person),
            name: name.to_string(),
            input: json!({ "person_name": person }),
        }],
        finish_reason: FinishReason::ToolCalls,
        usage: Usage::default(),
    }
}

fn lookup_registry() -> Arc<ToolRegistry> {
    Arc::new(
        ToolRegistry::from_tools([
            Arc::new(LookupTool::calendar()) as DynTool,
            Arc::new(LookupTool::email()) as DynTool,
        ])
        .unwrap(),
    )
}

fn schema_agent(client: Arc<ScriptedClient>, max_steps: usize) -> Agent {
    let config = AgentConfig {
        max_steps,
        ..AgentConfig::default()
    };
    Agent::new(client, lookup_registry(), Arc::new(SchemaMode), config)
}

#[tokio::test]
async fn calendar_then_email_then_done() {
    let client = ScriptedClient::new(vec![
        tool_call("calendar", "alice"),
        tool_call("email", "alice"),
        LLMOutput::text("DONE: Alice has a 2pm meeting and an email about Q4 planning."),
    ]);
    let agent = schema_agent(client.clone(), 10);

    let result = agent.run("What is going on with alice?").await.unwrap();

    assert_eq!(
        result.answer,
        "Alice has a 2pm meeting and an email about Q4 planning."
    );
    let trace: Vec<(&str, &str)> = result
        .steps
        .iter()
        .map(|s| (s.tool_name.as_str(), s.argument.as_str()))
        .collect();
    assert_eq!(trace, vec![("calendar", "alice"), ("email", "alice")]);
    assert_eq!(
        result.tool_outputs(),
        "Calendar for alice: Meeting with clients at 2pm\nEmails from alice: Latest email about Q4 planning"
    );
    assert_eq!(result.turns, 5);

    let requests = client.requests();
    assert_eq!(requests.len(), 3);
    let counts: Vec<usize> = requests.iter().map(|r| r.messages.len()).collect();
    assert_eq!(counts, vec![1, 3, 5]);
    assert_eq!(requests[2].messages[3].role, MessageRole::Assistant);
    assert!(requests[2].messages[3].content.contains("Emails from alice"));
}

#[tokio::test]
async fn immediate_completion_uses_no_tools() {
    let client = ScriptedClient::new(vec![LLMOutput::text("DONE: no information needed")]);
    let result = schema_agent(client.clone(), 10).run("hello").await.unwrap();

    assert_eq!(result.answer, "no information needed");
    assert!(result.steps.is_empty());
    assert_eq!(client.requests().len(), 1);
}

#[tokio::test]
async fn endless_chatter_hits_turn_ceiling() {
    let client = ScriptedClient::new(vec![LLMOutput::text("Let me think about that some more.")]);
    let err = schema_agent(client.clone(), 5).run("hello").await.unwrap_err();

    assert!(matches!(err, AgentError::TerminationBudgetExceeded { max_steps: 5, .. }));
    let requests = client.requests();
    assert_eq!(requests.len(), 5);
    // The conversation grows on every iteration even when nothing is dispatched.
    for pair in requests.windows(2) {
        assert!(pair[1].messages.len() > pair[0].messages.len());
    }
}

#[tokio::test]
async fn turn_ceiling_reports_tools_already_run() {
    let client = ScriptedClient::new(vec![
        tool_call("calendar", "bob"),
        LLMOutput::text("Still thinking."),
    ]);
    let err = schema_agent(client, 3).run("bob?").await.unwrap_err();

    assert!(err.to_string().contains("3 steps"));
    let steps = err.steps();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].output, "Calendar for bob: Team standup at 10am");
}

#[tokio::test]
async fn slow_tool_times_out_and_run_continues() {
    let registry = Arc::new(
        ToolRegistry::from_tools([Arc::new(FnTool::new("calendar", "Slow calendar", |_| {
            std::thread::sleep(std::time::Duration::from_millis(300));
            Ok("too late".to_string())
        })) as DynTool])
        .unwrap(),
    );
    let client = ScriptedClient::new(vec![
        tool_call("calendar", "alice"),
        LLMOutput::text("DONE: calendar was too slow"),
    ]);
    let config = AgentConfig {
        tool_timeout: Some(std::time::Duration::from_millis(20)),
        ..AgentConfig::default()
    };
    let agent = Agent::new(client.clone(), registry, Arc::new(SchemaMode), config);

    let result = agent.run("alice?").await.unwrap();
    assert_eq!(result.answer, "calendar was too slow");
    assert!(result.steps[0].is_error);
    assert!(client.requests()[1].messages[1].content.contains("Timed out"));
}

#[tokio::test]
async fn unknown_tool_is_skipped_and_loop_continues() {
    let client = ScriptedClient::new(vec![
        tool_call("weather", "alice"),
        LLMOutput::text("DONE: no weather tool"),
    ]);
    let result = schema_agent(client.clone(), 10).run("weather?").await.unwrap();

    assert_eq!(result.answer, "no weather tool");
    assert!(result.steps.is_empty());
    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].messages.len(), 3);
}

#[tokio::test]
async fn tool_names_resolve_ignoring_case() {
    let client = ScriptedClient::new(vec![
        tool_call("CALENDAR", "bob"),
        tool_call("Calendar", "charlie"),
        LLMOutput::text("DONE: checked"),
    ]);
    let result = schema_agent(client, 10).run("calendars").await.unwrap();

    let names: Vec<&str> = result.steps.iter().map(|s| s.tool_name.as_str()).collect();
    assert_eq!(names, vec!["calendar", "calendar"]);
    assert_eq!(result.steps[1].output, "Calendar for charlie: Lunch meeting at 12pm");
}

#[tokio::test]
async fn multiple_requests_in_one_turn_run_in_order() {
    let both = LLMOutput {
        content: vec![
            ContentBlock::Text {
                text: "Checking both sources.".to_string(),
            },
            ContentBlock::ToolUse {
                id: "toolu_1".to_string(),
                name: "email".to_string(),
                input: json!({ "person_name": "bob" }),
            },
            ContentBlock::ToolUse {
                id: "toolu_2".to_string(),
                name: "calendar".to_string(),
                input: json!({ "person_name": "" }),
            },
            ContentBlock::ToolUse {
                id: "toolu_3".to_string(),
                name: "calendar".to_string(),
                input: json!({ "person_name": "bob" }),
            },
        ],
        finish_reason: FinishReason::ToolCalls,
        usage: Usage::default(),
    };
    let client = ScriptedClient::new(vec![both, LLMOutput::text("DONE: bob is busy")]);
    let result = schema_agent(client.clone(), 10).run("bob?").await.unwrap();

    let names: Vec<&str> = result.steps.iter().map(|s| s.tool_name.as_str()).collect();
    assert_eq!(names, vec!["email", "calendar"]);
    // Two dispatched tools, two turns each; the empty-argument request adds nothing.
    assert_eq!(client.requests()[1].messages.len(), 5);
}

#[tokio::test]
async fn failing_tool_is_folded_into_conversation() {
    let registry = Arc::new(
        ToolRegistry::from_tools([Arc::new(FnTool::new("calendar", "Broken calendar", |_| {
            Err(ToolError::ExecutionFailed("calendar service unavailable".to_string()))
        })) as DynTool])
        .unwrap(),
    );
    let client = ScriptedClient::new(vec![
        tool_call("calendar", "alice"),
        LLMOutput::text("DONE: The calendar could not be reached."),
    ]);
    let agent = Agent::new(
        client.clone(),
        registry,
        Arc::new(SchemaMode),
        AgentConfig::default(),
    );

    let result = agent.run("alice?").await.unwrap();
    assert_eq!(result.answer, "The calendar could not be reached.");
    assert_eq!(result.steps.len(), 1);
    assert!(result.steps[0].is_error);
    assert!(client.requests()[1].messages[1]
        .content
        .contains("calendar service unavailable"));
}

#[tokio::test]
async fn empty_completion_is_reprompted() {
    let client = ScriptedClient::new(vec![
        LLMOutput::text("DONE:   "),
        LLMOutput::text("DONE: finally"),
    ]);
    let result = schema_agent(client.clone(), 10).run("q").await.unwrap();

    assert_eq!(result.answer, "finally");
    assert_eq!(client.requests().len(), 2);
}

#[tokio::test]
async fn text_mode_passes_query_to_named_tools() {
    let client = ScriptedClient::new(vec![
        LLMOutput::text("calendar"),
        LLMOutput::text("Email"),
        LLMOutput::text("DONE: Alice has a 2pm meeting and an email about Q4 planning."),
    ]);
    let agent = Agent::new(
        client.clone(),
        lookup_registry(),
        Arc::new(TextPromptMode),
        AgentConfig::default(),
    );

    let result = agent.run("alice").await.unwrap();
    assert_eq!(result.steps.len(), 2);
    assert_eq!(result.steps[0].output, "Calendar for alice: Meeting with clients at 2pm");
    assert_eq!(result.steps[1].tool_name, "email");
    assert_eq!(result.steps[1].argument, "alice");

    let requests = client.requests();
    assert!(requests.iter().all(|r| r.tools.is_empty()));
    assert!(requests[0].system_prompt.contains("- email: Searches emails for a person"));
}
