//! Unified error classification and recovery.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    /// The model session failed to answer.
    Transport,
    /// A tool call could not be resolved, decoded, or executed.
    ToolExecution,
    /// Schema generation or engine configuration was rejected.
    Configuration,
    /// The run hit its round-trip cap.
    Limit,
    /// The run was cancelled or its deadline expired.
    Interrupted,
    Serialization,
    Unknown,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Hand the error back to the model as a tool result.
    ReportToModel,
    CheckConfiguration,
    RaiseTurnLimit,
    IncreaseTimeout,
    CheckTransport,
    CheckToolImplementation,
    None,
}
