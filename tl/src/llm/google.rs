//! Google Gemini API client implementation
//!
//! Implements the LlmClient trait for the Gemini `generateContent` endpoint
//! with function calling.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::retry::post_json;
use super::{
    CompletionRequest, CompletionResponse, ContentBlock, LlmClient, LlmError, Message, MessageContent, Role,
    StopReason, TokenUsage, ToolCall,
};
use crate::config::ResolvedLlmConfig;

/// Google Gemini API client
pub struct GoogleClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
    max_retries: u32,
}

impl GoogleClient {
    /// Create a new client from resolved configuration
    pub fn from_config(config: &ResolvedLlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, base_url = %config.base_url, "GoogleClient::from_config: called");
        let api_key = config.get_api_key()?;
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.clone(),
            http,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
        })
    }

    fn generate_url(&self) -> String {
        let model = self.model.trim();
        if model.starts_with("models/") {
            format!("{}/{}:generateContent", self.base_url, model)
        } else {
            format!("{}/models/{}:generateContent", self.base_url, model)
        }
    }

    /// Build the request body for the Gemini API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, %request.max_tokens, "build_request_body: called");
        let mut body = serde_json::json!({
            "contents": convert_messages(&request.messages),
            "generationConfig": {
                "maxOutputTokens": request.max_tokens.min(self.max_tokens),
            },
        });

        if !request.system_prompt.is_empty() {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": request.system_prompt }]
            });
        }

        if !request.tools.is_empty() {
            let decls: Vec<_> = request.tools.iter().map(|t| t.to_google_declaration()).collect();
            body["tools"] = serde_json::json!([{ "functionDeclarations": decls }]);
            body["toolConfig"] = serde_json::json!({ "functionCallingConfig": { "mode": "AUTO" } });
        }

        body
    }

    /// Parse the Gemini API response
    fn parse_response(&self, api_response: GoogleResponse) -> Result<CompletionResponse, LlmError> {
        let candidate = api_response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("Gemini returned no candidates".to_string()))?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for (seq, part) in candidate.content.map(|c| c.parts).unwrap_or_default().into_iter().enumerate() {
            if let Some(t) = part.text
                && !part.thought.unwrap_or(false)
            {
                text.push_str(&t);
            }
            if let Some(call) = part.function_call {
                debug!(name = %call.name, "parse_response: functionCall part");
                tool_calls.push(ToolCall {
                    id: call.id.unwrap_or_else(|| format!("call_{}", seq)),
                    name: call.name,
                    input: call.args.unwrap_or_else(|| serde_json::json!({})),
                    signature: part.thought_signature,
                });
            }
        }

        let stop_reason = StopReason::from_google(candidate.finish_reason.as_deref(), !tool_calls.is_empty());
        let usage = api_response.usage_metadata.unwrap_or_default();

        Ok(CompletionResponse {
            content: if text.is_empty() { None } else { Some(text) },
            tool_calls,
            stop_reason,
            usage: TokenUsage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            },
        })
    }
}

/// Convert internal messages to Gemini `contents`
///
/// Gemini identifies function responses by function name, so call ids are
/// mapped back to names from earlier assistant turns. Consecutive tool
/// messages collapse into one user turn.
fn convert_messages(messages: &[Message]) -> Vec<serde_json::Value> {
    debug!(message_count = %messages.len(), "convert_messages: called");
    let mut names: HashMap<String, String> = HashMap::new();
    let mut contents: Vec<serde_json::Value> = Vec::new();
    let mut pending_responses: Vec<serde_json::Value> = Vec::new();

    for msg in messages {
        if msg.role != Role::Tool && !pending_responses.is_empty() {
            contents.push(serde_json::json!({ "role": "user", "parts": std::mem::take(&mut pending_responses) }));
        }

        match (msg.role, &msg.content) {
            (Role::Tool, MessageContent::Blocks(blocks)) => {
                for block in blocks {
                    if let ContentBlock::ToolResult {
                        tool_use_id,
                        content,
                        is_error,
                    } = block
                    {
                        let name = names.get(tool_use_id).cloned().unwrap_or_else(|| tool_use_id.clone());
                        let response = if *is_error {
                            serde_json::json!({ "name": name, "error": content })
                        } else {
                            serde_json::json!({ "name": name, "content": content })
                        };
                        pending_responses.push(serde_json::json!({
                            "functionResponse": { "name": name, "response": response }
                        }));
                    }
                }
            }
            (Role::Tool, MessageContent::Text(text)) => {
                pending_responses.push(serde_json::json!({ "text": text }));
            }
            (role, content) => {
                let gemini_role = if role == Role::Assistant { "model" } else { "user" };
                let parts: Vec<serde_json::Value> = match content {
                    MessageContent::Text(text) => vec![serde_json::json!({ "text": text })],
                    MessageContent::Blocks(blocks) => blocks
                        .iter()
                        .filter_map(|block| match block {
                            ContentBlock::Text { text } if !text.is_empty() => Some(serde_json::json!({ "text": text })),
                            ContentBlock::Text { .. } => None,
                            ContentBlock::ToolUse {
                                id,
                                name,
                                input,
                                signature,
                            } => {
                                names.insert(id.clone(), name.clone());
                                let mut part = serde_json::json!({
                                    "functionCall": { "name": name, "args": input }
                                });
                                if let Some(sig) = signature {
                                    part["thoughtSignature"] = serde_json::json!(sig);
                                }
                                Some(part)
                            }
                            ContentBlock::ToolResult { content, .. } => Some(serde_json::json!({ "text": content })),
                        })
                        .collect(),
                };
                if !parts.is_empty() {
                    contents.push(serde_json::json!({ "role": gemini_role, "parts": parts }));
                }
            }
        }
    }

    if !pending_responses.is_empty() {
        contents.push(serde_json::json!({ "role": "user", "parts": pending_responses }));
    }

    contents
}

#[async_trait]
impl LlmClient for GoogleClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, message_count = %request.messages.len(), "GoogleClient::complete: called");
        let url = self.generate_url();
        let body = self.build_request_body(&request);

        let response = post_json(&self.http, &url, &body, self.max_retries, |r| {
            r.header("x-goog-api-key", &self.api_key)
        })
        .await?;

        let api_response: GoogleResponse = response.json().await?;
        self.parse_response(api_response)
    }

    fn provider(&self) -> &'static str {
        "google"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
    usage_metadata: Option<GoogleUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleCandidate {
    content: Option<GoogleContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleContent {
    #[serde(default)]
    parts: Vec<GooglePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GooglePart {
    text: Option<String>,
    thought: Option<bool>,
    function_call: Option<GoogleFunctionCall>,
    thought_signature: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleFunctionCall {
    id: Option<String>,
    name: String,
    args: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleUsage {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}
