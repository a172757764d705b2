//! LLM client module for tubeloop
//!
//! Provider-agnostic completion requests with tool calling.

use std::sync::Arc;

use tracing::debug;

mod anthropic;
pub mod client;
mod error;
mod google;
mod openai;
mod retry;
mod types;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use error::LlmError;
pub use google::GoogleClient;
pub use openai::OpenAIClient;
pub use types::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, MessageContent, Role, StopReason, TokenUsage,
    ToolCall, ToolDefinition,
};

use crate::config::{LlmConfig, Provider, ResolvedLlmConfig};

/// Create an LLM client based on the provider specified in config
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    let resolved = config.resolve()?;
    create_client_from_resolved(&resolved)
}

/// Create an LLM client from a resolved configuration
pub fn create_client_from_resolved(config: &ResolvedLlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client_from_resolved: called");
    match config.provider {
        Provider::Google => {
            debug!("create_client_from_resolved: creating Gemini client");
            Ok(Arc::new(GoogleClient::from_config(config)?))
        }
        Provider::Anthropic => {
            debug!("create_client_from_resolved: creating Anthropic client");
            Ok(Arc::new(AnthropicClient::from_config(config)?))
        }
        Provider::OpenAI => {
            debug!("create_client_from_resolved: creating OpenAI client");
            Ok(Arc::new(OpenAIClient::from_config(config)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_unknown_provider_is_rejected() {
        let config = LlmConfig {
            provider: "cohere".to_string(),
            ..Default::default()
        };
        let err = create_client(&config).err().unwrap();
        assert!(matches!(err, LlmError::UnknownProvider(ref p) if p == "cohere"));
    }

    #[test]
    #[serial]
    fn test_missing_key_is_reported_with_variable_name() {
        let config = LlmConfig {
            api_key_env: Some("TUBELOOP_TEST_ABSENT_KEY".to_string()),
            ..Default::default()
        };
        // SAFETY: serialized with other env-mutating tests
        unsafe { std::env::remove_var("TUBELOOP_TEST_ABSENT_KEY") };
        let err = create_client(&config).err().unwrap();
        assert!(err.to_string().contains("TUBELOOP_TEST_ABSENT_KEY"));
    }

    #[test]
    #[serial]
    fn test_create_each_provider() {
        // SAFETY: serialized with other env-mutating tests
        unsafe { std::env::set_var("TUBELOOP_TEST_ANY_KEY", "k") };
        for (provider, name) in [("google_genai", "google"), ("anthropic", "anthropic"), ("openai", "openai")] {
            let config = LlmConfig {
                provider: provider.to_string(),
                api_key_env: Some("TUBELOOP_TEST_ANY_KEY".to_string()),
                ..Default::default()
            };
            let client = create_client(&config).unwrap();
            assert_eq!(client.provider(), name);
        }
        unsafe { std::env::remove_var("TUBELOOP_TEST_ANY_KEY") };
    }
}
