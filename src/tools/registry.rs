//! Name-keyed tool registry and dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::arguments::ToolArguments;
use super::tool::{Tool, ToolExecutionContext, ToolSpec};
use super::validation::validate_arguments;
use crate::error::{CadreError, Result};
use crate::types::ToolCallRequest;
use crate::util::timeout::{guard, with_timeout};

/// Tools owned by one agent, kept in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tool, replacing any tool registered under the same name.
    ///
    /// A replacement keeps the slot of the tool it replaces, so the menu
    /// order stays stable. Returns the replaced tool.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Option<Arc<dyn Tool>> {
        let name = tool.name().to_string();
        match self.index.get(&name) {
            Some(&slot) => Some(std::mem::replace(&mut self.tools[slot], tool)),
            None => {
                self.index.insert(name, self.tools.len());
                self.tools.push(tool);
                None
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&slot| &self.tools[slot])
    }

    /// Specs of every tool in registration order.
    pub fn list_specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|tool| tool.spec()).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|tool| tool.name())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Resolve, decode, validate, and execute one tool call.
    ///
    /// Every failure that originates in the tool (unknown name, bad
    /// arguments, executor error, per-call timeout) comes back recoverable.
    /// Only run-level cancellation or deadline expiry is returned as-is.
    pub async fn dispatch(
        &self,
        call: &ToolCallRequest,
        ctx: &ToolExecutionContext,
        tool_timeout: Option<Duration>,
    ) -> Result<serde_json::Value> {
        let tool = self
            .lookup(&call.name)
            .ok_or_else(|| CadreError::UnknownTool(call.name.clone()))?;

        let args = ToolArguments::parse(&call.arguments)
            .map_err(|message| CadreError::decode(&call.name, message))?;
        validate_arguments(args.raw(), tool.parameters())
            .map_err(|message| CadreError::decode(&call.name, message))?;

        debug!(tool = %call.name, "dispatching tool call");
        let execution = async {
            match tool_timeout {
                Some(limit) => with_timeout(limit, tool.execute(&args, ctx)).await,
                None => tool.execute(&args, ctx).await,
            }
        };

        match guard(&ctx.run, execution).await {
            Ok(value) => Ok(value),
            Err(CadreError::Cancelled) if ctx.run.is_cancelled() => Err(CadreError::Cancelled),
            Err(err @ CadreError::Timeout(_)) if deadline_passed(ctx) => Err(err),
            Err(CadreError::Timeout(ms)) => Err(CadreError::tool(
                &call.name,
                format!("tool timed out after {ms}ms"),
            )),
            Err(err) if err.is_recoverable() => Err(err),
            Err(err) => Err(CadreError::tool(&call.name, err.to_string())),
        }
    }
}

fn deadline_passed(ctx: &ToolExecutionContext) -> bool {
    ctx.run
        .deadline()
        .is_some_and(|deadline| deadline <= tokio::time::Instant::now())
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
