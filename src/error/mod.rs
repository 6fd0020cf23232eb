//! Error types for cadre.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for all cadre operations.
#[derive(Error, Debug)]
pub enum CadreError {
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Turn limit exceeded: no final answer after {limit} round trips")]
    TurnLimitExceeded { limit: usize },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Argument decode error: {tool_name}: {message}")]
    ArgumentDecode { tool_name: String, message: String },

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported field type for '{field}': {type_name}")]
    UnsupportedFieldType { field: String, type_name: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Run cancelled")]
    Cancelled,

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CadreError {
    /// Create a transport error without an underlying source.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Create a transport error wrapping the collaborator's own error.
    pub fn transport_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a tool execution error.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Create an argument decode error.
    pub fn decode(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ArgumentDecode {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Whether this error is reported back to the model instead of ending the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownTool(_)
                | Self::ArgumentDecode { .. }
                | Self::ToolExecution { .. }
                | Self::InvalidArgument(_)
        )
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::UnknownTool(_)
            | Self::ArgumentDecode { .. }
            | Self::ToolExecution { .. }
            | Self::InvalidArgument(_) => ErrorCategory::ToolExecution,
            Self::UnsupportedFieldType { .. } | Self::Configuration(_) => {
                ErrorCategory::Configuration
            }
            Self::TurnLimitExceeded { .. } => ErrorCategory::Limit,
            Self::Cancelled | Self::Timeout(_) => ErrorCategory::Interrupted,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Io(_) => ErrorCategory::Unknown,
        }
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            Self::Timeout(_) => RecoverySuggestion::IncreaseTimeout,
            Self::ToolExecution { .. } => RecoverySuggestion::CheckToolImplementation,
            _ if self.is_recoverable() => RecoverySuggestion::ReportToModel,
            _ => match self.category() {
                ErrorCategory::Transport => RecoverySuggestion::CheckTransport,
                ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
                ErrorCategory::Limit => RecoverySuggestion::RaiseTurnLimit,
                _ => RecoverySuggestion::None,
            },
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, CadreError>;
