//! Transcript tools

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{opt_str_arg, str_arg};
use crate::tools::{Tool, ToolContext, ToolError};
use crate::youtube::{YouTubeSource, resolve_video_id, transcript_text};

fn transcript_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "video_id": {
                "type": "string",
                "description": "The YouTube video ID (e.g. \"dQw4w9WgXcQ\") or a video URL"
            },
            "language": {
                "type": "string",
                "description": "Language code for the transcript (e.g. \"en\", \"es\")"
            }
        },
        "required": ["video_id"]
    })
}

/// Fetch plain transcript text
pub struct FetchTranscriptTool {
    source: Arc<dyn YouTubeSource>,
    default_language: String,
}

impl FetchTranscriptTool {
    pub fn new(source: Arc<dyn YouTubeSource>, default_language: impl Into<String>) -> Self {
        Self {
            source,
            default_language: default_language.into(),
        }
    }
}

#[async_trait]
impl Tool for FetchTranscriptTool {
    fn name(&self) -> &'static str {
        "fetch_transcript"
    }

    fn description(&self) -> &'static str {
        "Fetches the transcript of a YouTube video as plain text."
    }

    fn input_schema(&self) -> Value {
        transcript_schema()
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let video_id = resolve_video_id(str_arg(&input, "video_id")?)?;
        let language = opt_str_arg(&input, "language").unwrap_or(&self.default_language);
        debug!(%video_id, %language, run_id = %ctx.run_id, "FetchTranscriptTool::execute: called");

        let snippets = self.source.transcript(&video_id, language).await?;
        Ok(Value::String(transcript_text(&snippets)))
    }
}

/// Fetch transcript snippets with start and duration
pub struct FetchTranscriptWithTimestampsTool {
    source: Arc<dyn YouTubeSource>,
    default_language: String,
}

impl FetchTranscriptWithTimestampsTool {
    pub fn new(source: Arc<dyn YouTubeSource>, default_language: impl Into<String>) -> Self {
        Self {
            source,
            default_language: default_language.into(),
        }
    }
}

#[async_trait]
impl Tool for FetchTranscriptWithTimestampsTool {
    fn name(&self) -> &'static str {
        "fetch_transcript_with_timestamps"
    }

    fn description(&self) -> &'static str {
        "Fetches the transcript of a YouTube video as a list of snippets with start time and duration in seconds."
    }

    fn input_schema(&self) -> Value {
        transcript_schema()
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let video_id = resolve_video_id(str_arg(&input, "video_id")?)?;
        let language = opt_str_arg(&input, "language").unwrap_or(&self.default_language);
        debug!(%video_id, %language, run_id = %ctx.run_id, "FetchTranscriptWithTimestampsTool::execute: called");

        let snippets = self.source.transcript(&video_id, language).await?;
        Ok(serde_json::to_value(snippets)?)
    }
}

/// List caption tracks for a video
pub struct ListTranscriptLanguagesTool {
    source: Arc<dyn YouTubeSource>,
}

impl ListTranscriptLanguagesTool {
    pub fn new(source: Arc<dyn YouTubeSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for ListTranscriptLanguagesTool {
    fn name(&self) -> &'static str {
        "list_transcript_languages"
    }

    fn description(&self) -> &'static str {
        "Lists the transcript languages available for a YouTube video, marking auto-generated tracks."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "video_id": {
                    "type": "string",
                    "description": "The YouTube video ID or a video URL"
                }
            },
            "required": ["video_id"]
        })
    }

    async fn execute(&self, input: Value, _ctx: &ToolContext) -> Result<Value, ToolError> {
        let video_id = resolve_video_id(str_arg(&input, "video_id")?)?;
        debug!(%video_id, "ListTranscriptLanguagesTool::execute: called");
        Ok(serde_json::to_value(self.source.transcript_languages(&video_id).await?)?)
    }
}
