//! Agents: identity, tool registry, and the conversation engine that drives them.

pub mod agent;
pub mod engine;
pub mod hierarchy;

pub use agent::{Agent, AgentIdentity};
pub use engine::{DispatchRecord, RunOutput};
pub use hierarchy::{sanitize_tool_name, SubAgentTool};
