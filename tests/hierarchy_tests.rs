//! Sub-agents registered as tools on a parent agent.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{wait_for_closes, ScriptedClient};
use pretty_assertions::assert_eq;
use serde_json::json;

use cadre::agent::sanitize_tool_name;
use cadre::prelude::*;
use tokio_util::sync::CancellationToken;

fn pong_agent() -> (Arc<Agent>, ScriptedClient) {
    let client = ScriptedClient::new();
    client.queue_text(&["pong"]);
    let identity = AgentIdentity::builder()
        .name("Pong Agent")
        .system_prompt("You answer ping with pong.")
        .build();
    (Arc::new(Agent::new(identity, client.arc())), client)
}

#[tokio::test]
async fn sub_agent_round_trip() {
    let (child, child_client) = pong_agent();

    let parent_client = ScriptedClient::new();
    parent_client
        .queue_tool_call("Pong_Agent", json!({"prompt": "ping"}))
        .queue_text(&["The child said pong."]);
    let mut parent = Agent::new(AgentIdentity::new("Coordinator"), parent_client.arc());
    parent.register_sub_agent(child);

    let output = parent.run_detailed("Say ping to the child").await.unwrap();

    assert_eq!(output.text, "The child said pong.");
    assert_eq!(child_client.sent(), vec![vec![ContentPart::text("ping")]]);
    assert_eq!(child_client.closes(), 1);
    let result = parent_client.sent_tool_result(1);
    assert!(!result.is_error);
    assert_eq!(result.name, "Pong_Agent");
    assert_eq!(result.result, json!({"result": "pong"}));
}

#[tokio::test]
async fn sub_agent_is_advertised_with_prompt_schema() {
    let (child, _child_client) = pong_agent();
    let parent_client = ScriptedClient::new();
    parent_client.queue_text(&["nothing to do"]);
    let mut parent = Agent::new(AgentIdentity::new("Coordinator"), parent_client.arc());
    parent.register_sub_agent(child);
    parent.run("idle").await.unwrap();

    let spec = parent_client.requests()[0].tools[0].clone();
    assert_eq!(spec.name, "Pong_Agent");
    assert_eq!(
        spec.description,
        "Asks the Pong Agent agent to perform its function. You answer ping with pong."
    );
    assert_eq!(
        serde_json::to_value(&spec.parameters).unwrap(),
        json!({
            "type": "object",
            "properties": {
                "prompt": {"type": "string", "description": "Instructions for the Pong Agent agent"}
            },
            "required": ["prompt"]
        })
    );
}

#[test]
fn explicit_description_wins() {
    let client = ScriptedClient::new();
    let identity = AgentIdentity::builder()
        .name("researcher")
        .description("Finds sources for a claim.")
        .build();
    let tool = SubAgentTool::new(Arc::new(Agent::new(identity, client.arc())));
    assert_eq!(tool.description(), "Finds sources for a claim.");
    assert_eq!(sanitize_tool_name("Weather Agent"), "Weather_Agent");
}

#[tokio::test]
async fn child_failure_is_recoverable_for_parent() {
    let child_client = ScriptedClient::new();
    child_client.queue_failure("child backend down");
    let child = Arc::new(Agent::new(AgentIdentity::new("worker"), child_client.arc()));

    let parent_client = ScriptedClient::new();
    parent_client
        .queue_tool_call("worker", json!({"prompt": "do it"}))
        .queue_text(&["The worker is unavailable."]);
    let mut parent = Agent::new(AgentIdentity::new("boss"), parent_client.arc());
    parent.register_sub_agent(child);

    let text = parent.run("delegate").await.unwrap();
    assert_eq!(text, "The worker is unavailable.");
    let result = parent_client.sent_tool_result(1);
    assert!(result.is_error);
    assert!(result.result["error"]
        .as_str()
        .unwrap()
        .contains("child backend down"));
}

#[tokio::test]
async fn missing_prompt_is_reported_to_parent_model() {
    let (child, child_client) = pong_agent();
    let parent_client = ScriptedClient::new();
    parent_client
        .queue_tool_call("Pong_Agent", json!({"question": "ping"}))
        .queue_text(&["I forgot the prompt."]);
    let mut parent = Agent::new(AgentIdentity::new("Coordinator"), parent_client.arc());
    parent.register_sub_agent(child);

    parent.run("go").await.unwrap();
    let result = parent_client.sent_tool_result(1);
    assert!(result.is_error);
    assert_eq!(
        result.result,
        json!({"error": "Argument decode error: Pong_Agent: missing required field 'prompt'"})
    );
    assert_eq!(child_client.opens(), 0);
}

#[tokio::test]
async fn run_as_tool_rejects_missing_prompt_directly() {
    let (child, child_client) = pong_agent();
    let ctx = ToolExecutionContext {
        tool_call_id: None,
        tool_name: "Pong_Agent".into(),
        run: RunContext::new(),
    };

    let missing = ToolArguments::new(json!({"question": "ping"}));
    let err = child.run_as_tool(&missing, &ctx).await.unwrap_err();
    assert!(matches!(err, CadreError::InvalidArgument(_)));

    let not_a_string = ToolArguments::new(json!({"prompt": 7}));
    let err = child.run_as_tool(&not_a_string, &ctx).await.unwrap_err();
    assert!(matches!(err, CadreError::InvalidArgument(_)));
    assert_eq!(child_client.opens(), 0);
}

fn silent_child() -> (Arc<Agent>, ScriptedClient) {
    let client = ScriptedClient::new();
    client.queue_hang();
    let child = Arc::new(Agent::new(AgentIdentity::new("sleeper"), client.arc()));
    (child, client)
}

#[tokio::test(start_paused = true)]
async fn child_session_closed_when_tool_timeout_abandons_it() {
    let (child, child_client) = silent_child();

    let parent_client = ScriptedClient::new();
    parent_client
        .queue_tool_call("sleeper", json!({"prompt": "wake up"}))
        .queue_text(&["gave up"]);
    let mut parent = Agent::new(AgentIdentity::new("boss"), parent_client.arc())
        .with_config(EngineConfig::builder().tool_timeout_ms(200).build());
    parent.register_sub_agent(child);

    assert_eq!(parent.run("delegate").await.unwrap(), "gave up");
    assert!(parent_client.sent_tool_result(1).is_error);

    wait_for_closes(&child_client, 1).await;
    assert_eq!(child_client.opens(), 1);
    assert_eq!(child_client.closes(), child_client.opens());
    assert_eq!(parent_client.closes(), 1);
}

#[tokio::test(start_paused = true)]
async fn child_session_closed_when_parent_is_cancelled() {
    let (child, child_client) = silent_child();

    let parent_client = ScriptedClient::new();
    parent_client.queue_tool_call("sleeper", json!({"prompt": "wake up"}));
    let mut parent = Agent::new(AgentIdentity::new("boss"), parent_client.arc());
    parent.register_sub_agent(child);

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let ctx = RunContext::new().with_cancellation(token);
    let err = parent.run_with_context("delegate", &ctx).await.unwrap_err();
    assert!(matches!(err, CadreError::Cancelled));
    assert_eq!(parent_client.closes(), 1);

    wait_for_closes(&child_client, 1).await;
    assert_eq!(child_client.opens(), 1);
    assert_eq!(child_client.closes(), child_client.opens());
}

#[tokio::test]
async fn re_entering_an_active_agent_is_rejected() {
    // A child that shares its parent's name stands in for a cycle.
    let child_client = ScriptedClient::new();
    child_client.queue_text(&["should not run"]);
    let child = Arc::new(Agent::new(AgentIdentity::new("planner"), child_client.arc()));

    let parent_client = ScriptedClient::new();
    parent_client
        .queue_tool_call("planner", json!({"prompt": "recurse"}))
        .queue_text(&["Recursion refused."]);
    let mut parent = Agent::new(AgentIdentity::new("planner"), parent_client.arc());
    parent.register_sub_agent(child);

    assert_eq!(parent.run("plan").await.unwrap(), "Recursion refused.");
    assert_eq!(child_client.opens(), 0);
    let result = parent_client.sent_tool_result(1);
    assert!(result.is_error);
    assert!(result.result["error"]
        .as_str()
        .unwrap()
        .contains("already running"));
}

#[tokio::test]
async fn run_as_tool_checks_call_chain_directly() {
    let (child, _client) = pong_agent();
    let ctx = ToolExecutionContext {
        tool_call_id: None,
        tool_name: "Pong_Agent".into(),
        run: RunContext::new().enter("Pong Agent"),
    };
    let args = ToolArguments::new(json!({"prompt": "ping"}));

    let err = child.run_as_tool(&args, &ctx).await.unwrap_err();
    assert!(matches!(err, CadreError::ToolExecution { .. }));
}

#[tokio::test]
async fn call_chain_is_visible_to_nested_tools() {
    let seen: Arc<Mutex<Vec<String>>> = Arc::default();

    let child_client = ScriptedClient::new();
    child_client
        .queue_tool_call("whoami", json!({}))
        .queue_text(&["recorded"]);
    let mut child = Agent::new(AgentIdentity::new("child"), child_client.arc());
    let sink = Arc::clone(&seen);
    child.register_tool(AgentTool::new(
        "whoami",
        "Records the call chain",
        Schema::empty(),
        move |_args, ctx| {
            let sink = Arc::clone(&sink);
            async move {
                *sink.lock().unwrap() = ctx.run.call_chain().to_vec();
                Ok(json!(null))
            }
        },
    ));

    let parent_client = ScriptedClient::new();
    parent_client
        .queue_tool_call("child", json!({"prompt": "check"}))
        .queue_text(&["ok"]);
    let mut parent = Agent::new(AgentIdentity::new("parent"), parent_client.arc());
    parent.register_sub_agent(Arc::new(child));

    parent.run("go").await.unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["parent".to_string(), "child".to_string()]);
    assert_eq!(
        parent_client.sent_tool_result(1).result,
        json!({"result": "recorded"})
    );
}
