//! Convenience re-exports for common use.

pub use crate::agent::{Agent, AgentIdentity, RunOutput, SubAgentTool};
pub use crate::config::EngineConfig;
pub use crate::context::RunContext;
pub use crate::error::{CadreError, Result};
pub use crate::schema::{DescribeRecord, FieldDescriptor, RecordDescription, Schema, SchemaKind};
pub use crate::session::{ModelClient, ModelSession, SessionRequest};
pub use crate::tools::{AgentTool, Tool, ToolArguments, ToolExecutionContext, ToolSpec, TypedTool};
pub use crate::types::{ContentPart, ModelResponse, ToolCallRequest, ToolResultPart};
