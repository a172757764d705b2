//! End-to-end tests for the tool-calling loop
//!
//! A scripted model and an in-memory YouTube drive the real registry,
//! executor and chain.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use tubeloop::chain::{Chain, ChainError};
use tubeloop::config::{ChainConfig, YouTubeConfig};
use tubeloop::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, Role, ToolCall};
use tubeloop::tools::{ToolExecutor, ToolRegistry};
use tubeloop::youtube::{
    ChannelInfo, Thumbnail, TranscriptLanguage, TranscriptSnippet, VideoMetadata, VideoStub, YouTubeError,
    YouTubeSource,
};

// =============================================================================
// Test doubles
// =============================================================================

struct ScriptedModel {
    replies: Mutex<VecDeque<CompletionResponse>>,
    seen: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    fn new(replies: Vec<CompletionResponse>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<CompletionRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedModel {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.seen.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::InvalidResponse("script exhausted".to_string()))
    }

    fn provider(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }
}

/// Every video exists; searches echo the query into titles
struct StaticYouTube;

#[async_trait]
impl YouTubeSource for StaticYouTube {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoStub>, YouTubeError> {
        Ok((1..=limit.min(3))
            .map(|i| VideoStub::new(format!("vid{:08}", i), format!("{} #{}", query, i)))
            .collect())
    }

    async fn transcript(&self, _video_id: &str, _language: &str) -> Result<Vec<TranscriptSnippet>, YouTubeError> {
        Ok(vec![TranscriptSnippet {
            text: "hello world".to_string(),
            start: 0.0,
            duration: 1.0,
        }])
    }

    async fn transcript_languages(&self, _video_id: &str) -> Result<Vec<TranscriptLanguage>, YouTubeError> {
        Ok(vec![])
    }

    async fn metadata(&self, _video_id: &str) -> Result<VideoMetadata, YouTubeError> {
        Ok(VideoMetadata {
            title: Some("A video".to_string()),
            views: Some(42),
            duration: Some(60),
            channel: Some("A channel".to_string()),
            likes: None,
            comments: None,
            chapters: vec![],
        })
    }

    async fn thumbnails(&self, video_id: &str) -> Result<Vec<Thumbnail>, YouTubeError> {
        Ok(vec![Thumbnail::new(
            format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id),
            Some(480),
            Some(360),
        )])
    }

    async fn channel(&self, target: &str) -> Result<ChannelInfo, YouTubeError> {
        Err(YouTubeError::InvalidUrl(target.to_string()))
    }
}

fn chain(model: Arc<ScriptedModel>, max_iterations: u32) -> Chain {
    let registry = ToolRegistry::youtube(Arc::new(StaticYouTube), &YouTubeConfig::default());
    let config = ChainConfig {
        max_iterations,
        ..Default::default()
    };
    Chain::new(model, ToolExecutor::new(registry), &config, 2048)
}

fn call(id: &str, name: &str, input: serde_json::Value) -> ToolCall {
    ToolCall::new(id, name, input)
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_search_then_answer() {
    let model = Arc::new(ScriptedModel::new(vec![
        CompletionResponse::with_tool_calls(vec![call("c1", "search_youtube", json!({"query": "cats"}))]),
        CompletionResponse::text("Found three cat videos."),
    ]));

    let run = chain(model.clone(), 10).run("search cats").await.unwrap();

    assert_eq!(run.answer, "Found three cat videos.");
    assert_eq!(run.model_calls, 2);
    assert_eq!(run.tool_calls, 1);

    let seen = model.seen();
    let tool_message = seen[1].messages.last().unwrap();
    assert_eq!(tool_message.role, Role::Tool);
    assert_eq!(tool_message.tool_result_id(), Some("c1"));
}

#[tokio::test]
async fn test_multi_step_research() {
    let model = Arc::new(ScriptedModel::new(vec![
        CompletionResponse::with_tool_calls(vec![call("c1", "search_youtube", json!({"query": "rust", "limit": "2"}))]),
        CompletionResponse::with_tool_calls(vec![
            call("c2", "get_full_metadata", json!({"url": "https://youtu.be/vid00000001"})),
            call("c3", "get_thumbnails", json!({"url": "vid00000001"})),
        ]),
        CompletionResponse::with_tool_calls(vec![call("c4", "get_channel_info", json!({"url": "nowhere"}))]),
        CompletionResponse::text("Summary"),
    ]));

    let run = chain(model.clone(), 10).run("research rust videos").await.unwrap();

    assert_eq!(run.model_calls, 4);
    assert_eq!(run.tool_calls, 4);
    // user, then (assistant, tools...) per turn, then the final assistant message
    assert_eq!(run.messages.len(), 1 + 2 + 3 + 2 + 1);
    let ids: Vec<&str> = run.messages.iter().filter_map(|m| m.tool_result_id()).collect();
    assert_eq!(ids, vec!["c1", "c2", "c3", "c4"]);
}

#[tokio::test]
async fn test_iteration_cap_is_fatal() {
    let looping = || CompletionResponse::with_tool_calls(vec![call("c", "extract_video_id", json!({"url": "x"}))]);
    let model = Arc::new(ScriptedModel::new(vec![looping(), looping(), looping(), looping()]));

    let err = chain(model.clone(), 3).run("loop").await.unwrap_err();

    assert!(matches!(err, ChainError::MaxIterations { max: 3 }));
    assert_eq!(model.seen().len(), 3);
}
