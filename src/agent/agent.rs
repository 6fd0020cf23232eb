//! Core Agent struct: identity, model binding, and tool registry.

use std::sync::Arc;

use bon::Builder;
use tracing::info;

use super::engine::{self, RunOutput};
use super::hierarchy::SubAgentTool;
use crate::config::EngineConfig;
use crate::context::RunContext;
use crate::error::Result;
use crate::session::ModelClient;
use crate::tools::{Tool, ToolRegistry};

/// Who an agent is, as seen by the model and by parent agents.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct AgentIdentity {
    #[builder(into)]
    pub name: String,
    /// Used as the tool description when the agent is wrapped as a sub-agent.
    #[builder(into)]
    pub description: Option<String>,
    #[builder(into)]
    pub system_prompt: Option<String>,
    /// Model name passed to the client when a session is opened.
    #[builder(into)]
    pub model: Option<String>,
}

impl AgentIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            system_prompt: None,
            model: None,
        }
    }
}

/// An agent bound to a model client, owning the tools it may call.
///
/// Register every tool before the first run; the registry is read-only
/// while a run is in flight.
pub struct Agent {
    identity: AgentIdentity,
    client: Arc<dyn ModelClient>,
    registry: ToolRegistry,
    config: EngineConfig,
}

impl Agent {
    pub fn new(identity: AgentIdentity, client: Arc<dyn ModelClient>) -> Self {
        Self {
            identity,
            client,
            registry: ToolRegistry::new(),
            config: EngineConfig::default(),
        }
    }

    /// Set engine limits.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn client(&self) -> &Arc<dyn ModelClient> {
        &self.client
    }

    /// Add a tool, replacing any tool with the same name.
    pub fn register_tool(&mut self, tool: impl Tool + 'static) -> &mut Self {
        self.registry.register(Arc::new(tool));
        self
    }

    /// Add several tools at once. Returns how many were registered.
    pub fn register_tools<I>(&mut self, tools: I) -> usize
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        let mut count = 0;
        for tool in tools {
            self.registry.register(tool);
            count += 1;
        }
        info!(agent = %self.identity.name, count, "registered tools");
        count
    }

    /// Expose `child` to this agent as a tool taking a single `prompt`.
    pub fn register_sub_agent(&mut self, child: Arc<Agent>) -> &mut Self {
        self.registry.register(Arc::new(SubAgentTool::new(child)));
        self
    }

    /// Run the conversation loop and return the final text.
    ///
    /// An empty string means the model ended without an answer; it is not
    /// an error.
    pub async fn run(&self, prompt: &str) -> Result<String> {
        Ok(self.run_detailed(prompt).await?.text)
    }

    /// Like [`Agent::run`], also reporting round trips and dispatched tools.
    pub async fn run_detailed(&self, prompt: &str) -> Result<RunOutput> {
        self.run_with_context(prompt, &RunContext::new()).await
    }

    /// Run under a caller-supplied cancellation token and deadline.
    pub async fn run_with_context(&self, prompt: &str, ctx: &RunContext) -> Result<RunOutput> {
        engine::run(self, prompt, ctx).await
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("identity", &self.identity)
            .field("provider", &self.client.provider_name())
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
