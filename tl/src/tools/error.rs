//! Tool error types

use thiserror::Error;

use crate::youtube::YouTubeError;

/// Errors that can occur during tool execution
///
/// None of these escape the executor; they are rendered into a failed
/// `ToolResult` for the model to read.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool '{name}' not found. Available tools: {available}")]
    UnknownTool { name: String, available: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    YouTube(#[from] YouTubeError),

    #[error("Tool panicked: {0}")]
    Panicked(String),

    #[error("Failed to serialize tool output: {0}")]
    Serialize(#[from] serde_json::Error),
}
