//! Model session boundary.
//!
//! The engine never talks to a provider directly. It asks a [`ModelClient`]
//! to open one [`ModelSession`] per run, sends content parts through it, and
//! closes it when the run ends. Wire formats and authentication live in the
//! client implementation.

use async_trait::async_trait;

use crate::error::Result;
use crate::tools::ToolSpec;
use crate::types::{ContentPart, ModelResponse};

/// Everything a client needs to open a session for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRequest {
    /// Name of the agent that owns the run.
    pub agent: String,
    /// Model name from the agent identity, if any.
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    /// Full tool menu, in registration order.
    pub tools: Vec<ToolSpec>,
}

/// One exchange channel with the model.
///
/// Errors returned from [`ModelSession::send`] are treated as transport
/// failures and end the run.
#[async_trait]
pub trait ModelSession: Send {
    /// Send one message and wait for the model's full response.
    async fn send(&mut self, parts: Vec<ContentPart>) -> Result<ModelResponse>;

    /// Release the session. Called once on every exit path of a run.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Explicit model binding owned by whoever constructs agents.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Provider name (e.g., "openai", "scripted").
    fn provider_name(&self) -> &str;

    async fn open_session(&self, request: SessionRequest) -> Result<Box<dyn ModelSession>>;
}
