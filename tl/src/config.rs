//! tubeloop configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Main tubeloop configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Tool-calling loop settings
    pub chain: ChainConfig,

    /// YouTube client settings
    pub youtube: YouTubeConfig,

    /// HTTP server settings
    pub server: ServerConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Fails fast when the provider is unknown or the API key variable is unset.
    pub fn validate(&self) -> Result<()> {
        self.llm.resolve()?.get_api_key()?;
        if self.chain.max_iterations == 0 {
            return Err(eyre::eyre!("chain.max-iterations must be at least 1"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain, then apply environment overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file_chain(config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read only the config file's log level, before logging is initialized
    ///
    /// Errors are swallowed here; the full `load` reports them once logging is up.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load_file_chain(config_path).ok().and_then(|c| c.log_level)
    }

    fn load_file_chain(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .tubeloop.yml
        let local_config = PathBuf::from(".tubeloop.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/tubeloop/tubeloop.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tubeloop").join("tubeloop.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply MODEL_PROVIDER, MODEL_NAME and LOG_LEVEL overrides
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("MODEL_PROVIDER").filter(|v| !v.is_empty()) {
            debug!(%provider, "apply_env_overrides: MODEL_PROVIDER");
            self.llm.provider = provider;
        }
        if let Some(model) = lookup("MODEL_NAME").filter(|v| !v.is_empty()) {
            debug!(%model, "apply_env_overrides: MODEL_NAME");
            self.llm.model = model;
        }
        if let Some(level) = lookup("LOG_LEVEL").filter(|v| !v.is_empty()) {
            self.log_level = Some(level);
        }
    }
}

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    Anthropic,
    OpenAI,
}

impl Provider {
    /// Environment variable holding the API key when none is configured
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Provider::Google => "GOOGLE_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }

    /// API base URL when none is configured
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Google => "https://generativelanguage.googleapis.com/v1beta",
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::OpenAI => "https://api.openai.com",
        }
    }
}

impl FromStr for Provider {
    type Err = crate::llm::LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" | "google_genai" | "gemini" => Ok(Provider::Google),
            "anthropic" => Ok(Provider::Anthropic),
            "openai" => Ok(Provider::OpenAI),
            other => Err(crate::llm::LlmError::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Google => write!(f, "google"),
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::OpenAI => write!(f, "openai"),
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: google (alias google_genai), anthropic, openai
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key (default derived from provider)
    #[serde(rename = "api-key-env")]
    pub api_key_env: Option<String>,

    /// API base URL (default derived from provider)
    #[serde(rename = "base-url")]
    pub base_url: Option<String>,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Retries for transient HTTP failures inside one model call
    #[serde(rename = "max-retries")]
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "google".to_string(),
            model: "gemini-3-pro-preview".to_string(),
            api_key_env: None,
            base_url: None,
            max_tokens: 8192,
            timeout_ms: 120_000,
            max_retries: 2,
        }
    }
}

impl LlmConfig {
    /// Resolve provider-derived defaults into a concrete client configuration
    pub fn resolve(&self) -> Result<ResolvedLlmConfig, crate::llm::LlmError> {
        debug!(provider = %self.provider, model = %self.model, "LlmConfig::resolve: called");
        let provider: Provider = self.provider.parse()?;

        Ok(ResolvedLlmConfig {
            provider,
            model: self.model.clone(),
            api_key_env: self
                .api_key_env
                .clone()
                .unwrap_or_else(|| provider.default_api_key_env().to_string()),
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| provider.default_base_url().to_string())
                .trim_end_matches('/')
                .to_string(),
            max_tokens: self.max_tokens,
            timeout_ms: self.timeout_ms,
            max_retries: self.max_retries,
        })
    }
}

/// LLM configuration with every provider default filled in
#[derive(Debug, Clone)]
pub struct ResolvedLlmConfig {
    pub provider: Provider,
    pub model: String,
    pub api_key_env: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl ResolvedLlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String, crate::llm::LlmError> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| crate::llm::LlmError::MissingApiKey {
                env: self.api_key_env.clone(),
            })
    }
}

/// Tool-calling loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Maximum model invocations per query
    #[serde(rename = "max-iterations")]
    pub max_iterations: u32,

    /// Run the tool calls of one model turn concurrently
    #[serde(rename = "parallel-tools")]
    pub parallel_tools: bool,

    /// System prompt sent with every request
    #[serde(rename = "system-prompt")]
    pub system_prompt: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            parallel_tools: false,
            system_prompt: "You are a helpful assistant that answers questions about YouTube videos. \
                            Use the available tools to search YouTube and to fetch transcripts, metadata, \
                            thumbnails and channel details. When a tool reports an error, adjust the \
                            arguments or explain the problem. Answer in plain text once you have what you need."
                .to_string(),
        }
    }
}

/// YouTube client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    /// Base URL of the YouTube web frontend
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Transcript language when the model does not name one
    #[serde(rename = "transcript-language")]
    pub transcript_language: String,

    /// Maximum search results returned to the model
    #[serde(rename = "search-limit")]
    pub search_limit: usize,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// User-Agent header sent to YouTube
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            transcript_language: "en".to_string(),
            search_limit: 10,
            timeout_ms: 30_000,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/124.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}
