//! search_youtube tool

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::str_arg;
use crate::tools::{Tool, ToolContext, ToolError};
use crate::youtube::YouTubeSource;

/// Upper bound on results regardless of what the model asks for
const MAX_LIMIT: usize = 50;

/// Search YouTube for videos
pub struct SearchYouTubeTool {
    source: Arc<dyn YouTubeSource>,
    default_limit: usize,
}

impl SearchYouTubeTool {
    pub fn new(source: Arc<dyn YouTubeSource>, default_limit: usize) -> Self {
        Self {
            source,
            default_limit: default_limit.clamp(1, MAX_LIMIT),
        }
    }
}

#[async_trait]
impl Tool for SearchYouTubeTool {
    fn name(&self) -> &'static str {
        "search_youtube"
    }

    fn description(&self) -> &'static str {
        "Search YouTube for videos matching the query. Returns a list of video titles, IDs, and URLs."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search term to look for on YouTube"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default: 10)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let query = str_arg(&input, "query")?;
        let limit = input
            .get("limit")
            .and_then(Value::as_i64)
            .map(|l| (l.max(1) as usize).min(MAX_LIMIT))
            .unwrap_or(self.default_limit);
        debug!(%query, %limit, iteration = %ctx.iteration, "SearchYouTubeTool::execute: called");

        let stubs = self.source.search(query, limit).await?;
        Ok(serde_json::to_value(stubs)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeYouTube;
    use serde_json::json;

    #[tokio::test]
    async fn test_search_returns_stubs() {
        let fake = Arc::new(FakeYouTube::new());
        let tool = SearchYouTubeTool::new(fake.clone(), 10);

        let out = tool
            .execute(json!({"query": "cats", "limit": 2}), &ToolContext::default())
            .await
            .unwrap();

        let items = out.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["url"], format!("https://youtu.be/{}", items[0]["video_id"].as_str().unwrap()));
        assert_eq!(fake.searches(), vec![("cats".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_limit_defaults_and_clamps() {
        let fake = Arc::new(FakeYouTube::new());
        let tool = SearchYouTubeTool::new(fake.clone(), 3);

        tool.execute(json!({"query": "a"}), &ToolContext::default()).await.unwrap();
        tool.execute(json!({"query": "b", "limit": 500}), &ToolContext::default())
            .await
            .unwrap();
        tool.execute(json!({"query": "c", "limit": -4}), &ToolContext::default())
            .await
            .unwrap();

        let limits: Vec<usize> = fake.searches().into_iter().map(|(_, l)| l).collect();
        assert_eq!(limits, vec![3, MAX_LIMIT, 1]);
    }
}
