//! Tool trait, closure-based tools, and typed-argument tools.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::arguments::ToolArguments;
use crate::context::RunContext;
use crate::error::{CadreError, Result};
use crate::schema::{schema_for, DescribeRecord, Schema};

/// What the model is told about a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Schema,
}

/// Context available during tool execution.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutionContext {
    /// Tool call id (if provided by the model).
    pub tool_call_id: Option<String>,
    /// Tool name as requested by the model.
    pub tool_name: String,
    /// Cancellation, deadline, and call chain of the run that issued the call.
    pub run: RunContext,
}

/// Core tool trait; implement to create custom tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the model calls).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Parameter schema.
    fn parameters(&self) -> &Schema;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters().clone(),
        }
    }

    /// Execute the tool with arguments already checked against [`Tool::parameters`].
    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value>;
}

/// Type alias for the tool handler function.
type ToolHandler = dyn Fn(ToolArguments, ToolExecutionContext) -> BoxFuture<'static, Result<serde_json::Value>>
    + Send
    + Sync;

/// Closure-based tool with a hand-built schema.
pub struct AgentTool {
    name: String,
    description: String,
    parameters: Schema,
    handler: Arc<ToolHandler>,
}

impl AgentTool {
    /// Create a tool from a closure.
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Schema,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Arc::new(
                move |args, ctx| -> BoxFuture<'static, Result<serde_json::Value>> {
                    Box::pin(handler(args, ctx))
                },
            ),
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
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
        (self.handler)(args.clone(), ctx.clone()).await
    }
}

impl std::fmt::Debug for AgentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

type TypedHandler<P> =
    dyn Fn(P, ToolExecutionContext) -> BoxFuture<'static, Result<serde_json::Value>> + Send + Sync;

/// Tool whose schema is generated from its argument type `P`.
///
/// The handler receives `P` already deserialized; a payload that does not
/// fit `P` fails with [`CadreError::ArgumentDecode`] before the handler runs.
pub struct TypedTool<P> {
    name: String,
    description: String,
    parameters: Schema,
    handler: Arc<TypedHandler<P>>,
}

impl<P> TypedTool<P>
where
    P: DescribeRecord + DeserializeOwned + Send + 'static,
{
    /// Fails with `UnsupportedFieldType` when `P` has a field the schema
    /// generator cannot express.
    pub fn new<F, Fut, R>(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: F,
    ) -> Result<Self>
    where
        F: Fn(P, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
        R: Serialize,
    {
        let parameters = schema_for::<P>()?;
        Ok(Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Arc::new(
                move |params: P, ctx| -> BoxFuture<'static, Result<serde_json::Value>> {
                    let fut = handler(params, ctx);
                    Box::pin(async move {
                        let output = fut.await?;
                        Ok(serde_json::to_value(output)?)
                    })
                },
            ),
        })
    }
}

#[async_trait]
impl<P> Tool for TypedTool<P>
where
    P: DeserializeOwned + Send + 'static,
{
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
        let params: P = args
            .deserialize()
            .map_err(|e| CadreError::decode(&self.name, e.to_string()))?;
        (self.handler)(params, ctx.clone()).await
    }
}

impl<P> std::fmt::Debug for TypedTool<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}
