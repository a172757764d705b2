//! extract_video_id tool

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::str_arg;
use crate::tools::{Tool, ToolContext, ToolError};
use crate::youtube::extract_video_id;

/// Pull the 11-character id out of a YouTube URL
pub struct ExtractVideoIdTool;

#[async_trait]
impl Tool for ExtractVideoIdTool {
    fn name(&self) -> &'static str {
        "extract_video_id"
    }

    fn description(&self) -> &'static str {
        "Extracts the 11-character YouTube video ID from a URL."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "A YouTube URL containing a video ID"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let url = str_arg(&input, "url")?;
        debug!(%url, run_id = %ctx.run_id, "ExtractVideoIdTool::execute: called");
        Ok(Value::String(extract_video_id(url)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_extracts_id() {
        let out = ExtractVideoIdTool
            .execute(json!({"url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ"}), &ToolContext::default())
            .await
            .unwrap();
        assert_eq!(out, "dQw4w9WgXcQ");
    }

    #[tokio::test]
    async fn test_invalid_url_errors() {
        let err = ExtractVideoIdTool
            .execute(json!({"url": "https://vimeo.com/123"}), &ToolContext::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid YouTube URL format"));
    }
}
