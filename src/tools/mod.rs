//! Tool system for function calling.

pub mod arguments;
pub mod registry;
pub mod tool;
pub mod validation;

pub use arguments::ToolArguments;
pub use registry::ToolRegistry;
pub use tool::{AgentTool, Tool, ToolExecutionContext, ToolSpec, TypedTool};
pub use validation::validate_arguments;
