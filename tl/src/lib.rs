//! tubeloop - YouTube research through a bounded LLM tool-calling loop
//!
//! A query goes to the model together with a small set of YouTube tools.
//! Whatever tools the model asks for are executed, their results appended
//! to the conversation, and the model is asked again, until it answers in
//! plain text or the iteration cap is reached.
//!
//! # Modules
//!
//! - [`chain`] - The bounded tool-calling loop
//! - [`llm`] - LLM client trait with Gemini, Anthropic and OpenAI implementations
//! - [`tools`] - Tool registry, executor and the YouTube tools
//! - [`youtube`] - YouTube data access over the public web frontend
//! - [`config`] - Configuration types and loading
//! - [`server`] - HTTP API
//! - [`cli`] - Command-line interface

pub mod chain;
pub mod cli;
pub mod config;
pub mod llm;
pub mod server;
pub mod tools;
pub mod youtube;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use chain::{Chain, ChainError, ChainRun, ChainState};
pub use config::{ChainConfig, Config, LlmConfig, YouTubeConfig};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, Message, ToolCall};
pub use tools::{Tool, ToolContext, ToolError, ToolExecutor, ToolRegistry, ToolResult};
pub use youtube::{WebYouTube, YouTubeError, YouTubeSource};
