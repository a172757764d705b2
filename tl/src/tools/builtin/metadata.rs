//! Video metadata and thumbnail tools

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::str_arg;
use crate::tools::{Tool, ToolContext, ToolError};
use crate::youtube::{YouTubeSource, resolve_video_id};

fn url_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "url": {
                "type": "string",
                "description": "YouTube video URL (any format) or bare video ID"
            }
        },
        "required": ["url"]
    })
}

/// Title, views, duration, channel, likes, comments and chapters
pub struct GetFullMetadataTool {
    source: Arc<dyn YouTubeSource>,
}

impl GetFullMetadataTool {
    pub fn new(source: Arc<dyn YouTubeSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for GetFullMetadataTool {
    fn name(&self) -> &'static str {
        "get_full_metadata"
    }

    fn description(&self) -> &'static str {
        "Extract metadata given a YouTube URL, including title, views, duration, channel, likes, comments, and chapters."
    }

    fn input_schema(&self) -> Value {
        url_schema()
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let video_id = resolve_video_id(str_arg(&input, "url")?)?;
        debug!(%video_id, iteration = %ctx.iteration, "GetFullMetadataTool::execute: called");
        Ok(serde_json::to_value(self.source.metadata(&video_id).await?)?)
    }
}

/// Available thumbnails with resolutions
pub struct GetThumbnailsTool {
    source: Arc<dyn YouTubeSource>,
}

impl GetThumbnailsTool {
    pub fn new(source: Arc<dyn YouTubeSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for GetThumbnailsTool {
    fn name(&self) -> &'static str {
        "get_thumbnails"
    }

    fn description(&self) -> &'static str {
        "Get available thumbnails for a YouTube video using its URL. Returns thumbnail URLs with width, height and resolution."
    }

    fn input_schema(&self) -> Value {
        url_schema()
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let video_id = resolve_video_id(str_arg(&input, "url")?)?;
        debug!(%video_id, iteration = %ctx.iteration, "GetThumbnailsTool::execute: called");
        Ok(serde_json::to_value(self.source.thumbnails(&video_id).await?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeYouTube;
    use serde_json::json;

    #[tokio::test]
    async fn test_metadata_shape() {
        let tool = GetFullMetadataTool::new(Arc::new(FakeYouTube::new()));
        let out = tool
            .execute(json!({"url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ"}), &ToolContext::default())
            .await
            .unwrap();

        for key in ["title", "views", "duration", "channel", "likes", "comments", "chapters"] {
            assert!(out.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(out["duration"], 213);
        assert!(out["comments"].is_null());
    }

    #[tokio::test]
    async fn test_thumbnails_shape() {
        let tool = GetThumbnailsTool::new(Arc::new(FakeYouTube::new()));
        let out = tool
            .execute(json!({"url": "dQw4w9WgXcQ"}), &ToolContext::default())
            .await
            .unwrap();
        assert_eq!(out[0]["resolution"], "120x90");
        assert_eq!(out[0]["width"], 120);
    }

    #[tokio::test]
    async fn test_unknown_video_propagates_not_found() {
        let tool = GetFullMetadataTool::new(Arc::new(FakeYouTube::new()));
        let err = tool
            .execute(json!({"url": "https://youtu.be/xxxxxxxxxxx"}), &ToolContext::default())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Video not found"));
    }
}
