//! Shared test helpers and a scripted model client.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use cadre::error::{CadreError, Result};
use cadre::session::{ModelClient, ModelSession, SessionRequest};
use cadre::types::{ContentPart, ModelResponse, ToolCallRequest, ToolResultPart};

/// One scripted reaction to a `send`.
pub enum Step {
    Respond(ModelResponse),
    Fail(String),
    /// Never answers; only a deadline or cancellation ends the send.
    Hang,
}

#[derive(Default)]
struct ScriptState {
    steps: Mutex<VecDeque<Step>>,
    sent: Mutex<Vec<Vec<ContentPart>>>,
    requests: Mutex<Vec<SessionRequest>>,
    opens: AtomicUsize,
    closes: AtomicUsize,
    fail_open: AtomicBool,
    fail_close: AtomicBool,
    hang_close: AtomicBool,
}

/// A model client that replays queued steps and records every outbound message.
#[derive(Clone, Default)]
pub struct ScriptedClient {
    state: Arc<ScriptState>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc(&self) -> Arc<dyn ModelClient> {
        Arc::new(self.clone())
    }

    fn push(&self, step: Step) -> &Self {
        self.state.steps.lock().unwrap().push_back(step);
        self
    }

    /// Queue a response made of text parts.
    pub fn queue_text(&self, parts: &[&str]) -> &Self {
        let parts = parts.iter().map(|text| ContentPart::text(*text)).collect();
        self.push(Step::Respond(ModelResponse::new(parts)))
    }

    /// Queue a response holding a single tool call.
    pub fn queue_tool_call(&self, name: &str, args: Value) -> &Self {
        self.queue_parts(vec![tool_call(name, args)])
    }

    pub fn queue_parts(&self, parts: Vec<ContentPart>) -> &Self {
        self.push(Step::Respond(ModelResponse::new(parts)))
    }

    pub fn queue_failure(&self, message: &str) -> &Self {
        self.push(Step::Fail(message.to_string()))
    }

    pub fn queue_hang(&self) -> &Self {
        self.push(Step::Hang)
    }

    pub fn fail_open(&self) {
        self.state.fail_open.store(true, Ordering::SeqCst);
    }

    pub fn fail_close(&self) {
        self.state.fail_close.store(true, Ordering::SeqCst);
    }

    /// Make `close` never complete.
    pub fn hang_close(&self) {
        self.state.hang_close.store(true, Ordering::SeqCst);
    }

    /// Every message sent to the model, across all sessions, in order.
    pub fn sent(&self) -> Vec<Vec<ContentPart>> {
        self.state.sent.lock().unwrap().clone()
    }

    /// Tool result carried by the `index`th outbound message.
    pub fn sent_tool_result(&self, index: usize) -> ToolResultPart {
        match self.sent().get(index).and_then(|parts| parts.first()) {
            Some(ContentPart::ToolResult(result)) => result.clone(),
            other => panic!("message {index} is not a tool result: {other:?}"),
        }
    }

    pub fn requests(&self) -> Vec<SessionRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn opens(&self) -> usize {
        self.state.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn open_session(&self, request: SessionRequest) -> Result<Box<dyn ModelSession>> {
        self.state.opens.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_open.load(Ordering::SeqCst) {
            return Err(CadreError::transport("connection refused"));
        }
        self.state.requests.lock().unwrap().push(request);
        Ok(Box::new(ScriptedSession {
            state: Arc::clone(&self.state),
        }))
    }
}

struct ScriptedSession {
    state: Arc<ScriptState>,
}

#[async_trait]
impl ModelSession for ScriptedSession {
    async fn send(&mut self, parts: Vec<ContentPart>) -> Result<ModelResponse> {
        self.state.sent.lock().unwrap().push(parts);
        let step = self.state.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Respond(response)) => Ok(response),
            Some(Step::Fail(message)) => Err(CadreError::transport(message)),
            Some(Step::Hang) => futures::future::pending().await,
            None => Err(CadreError::transport("script exhausted")),
        }
    }

    async fn close(&mut self) -> Result<()> {
        if self.state.hang_close.load(Ordering::SeqCst) {
            return futures::future::pending().await;
        }
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_close.load(Ordering::SeqCst) {
            return Err(CadreError::transport("close failed"));
        }
        Ok(())
    }
}

/// Yield until `client` has seen `expected` closes, giving background
/// close tasks a chance to run.
pub async fn wait_for_closes(client: &ScriptedClient, expected: usize) {
    for _ in 0..100 {
        if client.closes() >= expected {
            return;
        }
        tokio::task::yield_now().await;
    }
}

pub fn tool_call(name: &str, args: Value) -> ContentPart {
    ContentPart::ToolCall(ToolCallRequest::new(name, args))
}
