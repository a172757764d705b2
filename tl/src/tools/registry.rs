//! ToolRegistry - name to tool lookup

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::YouTubeConfig;
use crate::llm::ToolDefinition;
use crate::youtube::YouTubeSource;

use super::builtin::{
    ExtractVideoIdTool, FetchTranscriptTool, FetchTranscriptWithTimestampsTool, GetChannelInfoTool,
    GetFullMetadataTool, GetThumbnailsTool, ListTranscriptLanguagesTool, SearchYouTubeTool,
};
use super::{Tool, ToolError};

/// Registered tools, ordered by name
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every YouTube tool, all backed by `source`
    pub fn youtube(source: Arc<dyn YouTubeSource>, config: &YouTubeConfig) -> Self {
        debug!(language = %config.transcript_language, limit = %config.search_limit, "ToolRegistry::youtube: called");
        let language = config.transcript_language.clone();
        let mut registry = Self::new();

        registry.register(Box::new(ExtractVideoIdTool));
        registry.register(Box::new(SearchYouTubeTool::new(source.clone(), config.search_limit)));
        registry.register(Box::new(FetchTranscriptTool::new(source.clone(), language.clone())));
        registry.register(Box::new(FetchTranscriptWithTimestampsTool::new(
            source.clone(),
            language,
        )));
        registry.register(Box::new(ListTranscriptLanguagesTool::new(source.clone())));
        registry.register(Box::new(GetFullMetadataTool::new(source.clone())));
        registry.register(Box::new(GetThumbnailsTool::new(source.clone())));
        registry.register(Box::new(GetChannelInfoTool::new(source)));

        registry
    }

    /// Add a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            debug!(%name, "ToolRegistry::register: replaced existing tool");
        }
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Result<&dyn Tool, ToolError> {
        self.tools.get(name).map(|t| t.as_ref()).ok_or_else(|| ToolError::UnknownTool {
            name: name.to_string(),
            available: self.names().join(", "),
        })
    }

    /// Tool definitions for the LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|t| ToolDefinition::new(t.name(), t.description(), t.input_schema()))
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
