//! Sub-agents exposed as tools.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use serde_json::json;
use tracing::warn;

use super::agent::Agent;
use crate::error::{CadreError, Result};
use crate::schema::Schema;
use crate::tools::{Tool, ToolArguments, ToolExecutionContext};

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
///
/// `"Weather Agent"` becomes `"Weather_Agent"`.
pub fn sanitize_tool_name(name: &str) -> String {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    let invalid = INVALID
        .get_or_init(|| Regex::new(r"[^A-Za-z0-9_-]").expect("tool name regex must compile"));
    invalid.replace_all(name, "_").into_owned()
}

/// A child agent wrapped as a single-argument tool.
pub struct SubAgentTool {
    name: String,
    description: String,
    parameters: Schema,
    agent: Arc<Agent>,
}

impl SubAgentTool {
    pub fn new(agent: Arc<Agent>) -> Self {
        let identity = agent.identity();
        let description = identity.description.clone().unwrap_or_else(|| {
            format!(
                "Asks the {} agent to perform its function. {}",
                identity.name,
                identity.system_prompt.as_deref().unwrap_or_default()
            )
            .trim_end()
            .to_string()
        });
        let parameters = Schema::object()
            .string(
                "prompt",
                format!("Instructions for the {} agent", identity.name),
                true,
            )
            .build();
        Self {
            name: sanitize_tool_name(&identity.name),
            description,
            parameters,
            agent,
        }
    }

    pub fn agent(&self) -> &Arc<Agent> {
        &self.agent
    }
}

#[async_trait]
impl Tool for SubAgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &Schema {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value> {
        self.agent.run_as_tool(args, ctx).await
    }
}

impl std::fmt::Debug for SubAgentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubAgentTool")
            .field("name", &self.name)
            .field("agent", &self.agent.name())
            .finish()
    }
}

impl Agent {
    /// Run this agent on behalf of a parent's tool call.
    ///
    /// Returns `{"result": text}`. A failed child run, or an attempt to
    /// re-enter an agent already running higher up the call chain, comes
    /// back as a `ToolExecution` error so the parent can report it to its
    /// model. Cancellation and deadline expiry pass through unchanged.
    ///
    /// Called through a registry, a missing or non-string `prompt` is caught
    /// by schema validation first and reported as `ArgumentDecode`; called
    /// directly, it fails with `InvalidArgument`.
    pub async fn run_as_tool(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value> {
        let prompt = args.get_str("prompt")?;

        if ctx.run.is_active(self.name()) {
            warn!(
                agent = %self.name(),
                chain = ?ctx.run.call_chain(),
                "rejected sub-agent re-entry"
            );
            return Err(CadreError::tool(
                &ctx.tool_name,
                format!("agent '{}' is already running in this call chain", self.name()),
            ));
        }

        match self.run_with_context(prompt, &ctx.run).await {
            Ok(output) => Ok(json!({ "result": output.text })),
            Err(err @ (CadreError::Cancelled | CadreError::Timeout(_))) => Err(err),
            Err(err) => Err(CadreError::tool(&ctx.tool_name, err.to_string())),
        }
    }
}
