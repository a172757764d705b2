//! Built-in YouTube tools
//!
//! Each tool is a thin adapter from model arguments to one `YouTubeSource`
//! call. Arguments arrive already validated against the tool's schema.

use serde_json::Value;

use super::ToolError;

mod channel;
mod metadata;
mod search;
mod transcript;
mod video_id;

pub use channel::GetChannelInfoTool;
pub use metadata::{GetFullMetadataTool, GetThumbnailsTool};
pub use search::SearchYouTubeTool;
pub use transcript::{FetchTranscriptTool, FetchTranscriptWithTimestampsTool, ListTranscriptLanguagesTool};
pub use video_id::ExtractVideoIdTool;

/// Required string argument
fn str_arg<'a>(input: &'a Value, name: &str) -> Result<&'a str, ToolError> {
    input
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidArgument(format!("'{}' is required", name)))
}

/// Optional string argument; blank counts as absent
fn opt_str_arg<'a>(input: &'a Value, name: &str) -> Option<&'a str> {
    input.get(name).and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}
