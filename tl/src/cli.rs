//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Query used when `query` is run without one
pub const DEFAULT_QUERY: &str = "Show top 3 US trending videos with metadata and thumbnails";

/// tubeloop - YouTube research through an LLM tool-calling loop
#[derive(Parser)]
#[command(
    name = "tubeloop",
    about = "Let a language model answer questions using YouTube search, transcript and metadata tools",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/tubeloop/logs/tubeloop.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (overrides LOG_LEVEL and the config file)
    #[arg(short, long, global = true, help = "Log level: TRACE, DEBUG, INFO, WARN, ERROR")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Answer one query and print the result
    Query {
        /// Natural-language query
        #[arg(default_value = DEFAULT_QUERY)]
        query: String,

        /// Maximum model invocations
        #[arg(short, long)]
        max_iterations: Option<u32>,
    },

    /// Serve the HTTP API
    Serve {
        /// Listen address (overrides server.bind)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// List the tools offered to the model
    Tools,
}

/// Log file location
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tubeloop")
        .join("logs")
        .join("tubeloop.log")
}

/// Map a user-facing level name onto an `EnvFilter` level directive
pub fn normalize_log_level(level: &str) -> Option<&'static str> {
    match level.trim().to_uppercase().as_str() {
        "TRACE" => Some("trace"),
        "DEBUG" => Some("debug"),
        "INFO" => Some("info"),
        "WARN" | "WARNING" => Some("warn"),
        "ERROR" | "CRITICAL" | "FATAL" => Some("error"),
        _ => None,
    }
}

/// Pick the log level: `--log-level` > `LOG_LEVEL` > config file > INFO
pub fn resolve_log_level(cli: Option<&str>, env: Option<&str>, config: Option<&str>) -> eyre::Result<&'static str> {
    let raw = [cli, env, config]
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .unwrap_or("INFO");
    normalize_log_level(raw).ok_or_else(|| eyre::eyre!("Invalid log level: {}", raw))
}

/// Answer wrapped in the banner printed by `query`
pub fn format_result(answer: &str) -> String {
    let rule = "=".repeat(80);
    format!("\n{rule}\nRESULT:\n{rule}\n{answer}\n{rule}")
}
