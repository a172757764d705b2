//! tubeloop - CLI entry point

use std::fs;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{info, warn};

use tubeloop::chain::Chain;
use tubeloop::cli::{Cli, Command, format_result, get_log_path, resolve_log_level};
use tubeloop::config::Config;
use tubeloop::llm::create_client;
use tubeloop::server;
use tubeloop::tools::{ToolExecutor, ToolRegistry};
use tubeloop::youtube::WebYouTube;

/// Exit code used when the user interrupts a query
const EXIT_INTERRUPTED: i32 = 130;

/// `level` is an already-normalized directive (`trace` .. `error`)
fn setup_logging(level: &str) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Write to log file, not stdout/stderr
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;
    let filter = tracing_subscriber::EnvFilter::try_new(format!("{},hyper=warn,reqwest=warn,h2=warn", level))
        .context(format!("Invalid log level: {}", level))?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();

    info!("Logging initialized (level: {})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so LOG_LEVEL and API keys are visible below
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let env_level = std::env::var("LOG_LEVEL").ok();
    let config_level = Config::load_log_level(cli.config.as_ref());
    let level = resolve_log_level(cli.log_level.as_deref(), env_level.as_deref(), config_level.as_deref())?;
    setup_logging(level).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(
        "tubeloop loaded config: provider={}, model={}",
        config.llm.provider, config.llm.model
    );

    match cli.command {
        Some(Command::Query { query, max_iterations }) => cmd_query(config, &query, max_iterations).await,
        Some(Command::Serve { bind }) => cmd_serve(config, bind).await,
        Some(Command::Tools) => cmd_tools(&config),
        None => cmd_query(config, tubeloop::cli::DEFAULT_QUERY, None).await,
    }
}

fn build_registry(config: &Config) -> Result<ToolRegistry> {
    let source = WebYouTube::from_config(&config.youtube).context("Failed to create YouTube client")?;
    Ok(ToolRegistry::youtube(Arc::new(source), &config.youtube))
}

fn build_chain(config: &Config) -> Result<Chain> {
    config.validate()?;
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let executor = ToolExecutor::new(build_registry(config)?);
    Ok(Chain::new(llm, executor, &config.chain, config.llm.max_tokens))
}

/// Answer one query and print it between banner lines
async fn cmd_query(mut config: Config, query: &str, max_iterations: Option<u32>) -> Result<()> {
    if let Some(max) = max_iterations {
        config.chain.max_iterations = max;
    }
    let chain = build_chain(&config)?;

    tokio::select! {
        result = chain.run(query) => {
            let run = result?;
            info!(
                run_id = %run.run_id,
                model_calls = %run.model_calls,
                tool_calls = %run.tool_calls,
                "Query answered"
            );
            println!("{}", format_result(&run.answer));
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted by user");
            eprintln!("\nInterrupted");
            std::process::exit(EXIT_INTERRUPTED);
        }
    }
}

async fn cmd_serve(config: Config, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let chain = Arc::new(build_chain(&config)?);
    server::serve(chain, &bind).await
}

/// Print registered tools; needs no API key
fn cmd_tools(config: &Config) -> Result<()> {
    let registry = build_registry(config)?;
    for def in registry.definitions() {
        println!("{:<34} {}", def.name, def.description);
    }
    Ok(())
}
