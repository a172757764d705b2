//! get_channel_info tool

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::str_arg;
use crate::tools::{Tool, ToolContext, ToolError};
use crate::youtube::YouTubeSource;

pub struct GetChannelInfoTool {
    source: Arc<dyn YouTubeSource>,
}

impl GetChannelInfoTool {
    pub fn new(source: Arc<dyn YouTubeSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for GetChannelInfoTool {
    fn name(&self) -> &'static str {
        "get_channel_info"
    }

    fn description(&self) -> &'static str {
        "Get details about a YouTube channel: id, title, description, URL, subscriber count and video count. \
         Accepts a channel URL, an @handle, a channel ID, or the URL of any video on the channel."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Channel URL, @handle, channel ID, or a video URL"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, input: Value, _ctx: &ToolContext) -> Result<Value, ToolError> {
        let target = str_arg(&input, "url")?;
        debug!(%target, "GetChannelInfoTool::execute: called");
        Ok(serde_json::to_value(self.source.channel(target).await?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeYouTube;
    use serde_json::json;

    #[tokio::test]
    async fn test_channel_info_shape() {
        let tool = GetChannelInfoTool::new(Arc::new(FakeYouTube::new()));
        let out = tool
            .execute(json!({"url": "@rickastley"}), &ToolContext::default())
            .await
            .unwrap();
        assert_eq!(out["title"], "Rick Astley");
        assert_eq!(out["subscribers"], "4.2M subscribers");
        assert!(out.get("video_count").is_some());
    }
}
