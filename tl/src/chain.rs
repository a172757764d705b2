//! Chain - the bounded tool-calling loop
//!
//! One run submits the conversation to the model, executes whatever tools it
//! asks for, appends the results and resubmits, until the model answers
//! without requesting tools or the iteration cap is hit.
//!
//! ```text
//! AwaitingModel --(no tool calls)--> Done
//!      |    ^
//!      |    +----------------------- ExecutingTools
//!      +--(tool calls, cap reached)--> Failed
//! ```

use std::sync::Arc;

use thiserror::Error;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::ChainConfig;
use crate::llm::{CompletionRequest, LlmClient, LlmError, Message, TokenUsage, ToolCall, ToolDefinition};
use crate::tools::{ToolContext, ToolExecutor};

/// Answer used when the final model turn carries no text
pub const NO_RESPONSE: &str = "No response generated";

/// Loop-level failures; these end the query
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("Maximum iterations ({max}) reached without a final answer")]
    MaxIterations { max: u32 },

    #[error("Model invocation failed: {0}")]
    Llm(#[from] LlmError),
}

/// State of one run
#[derive(Debug)]
pub enum ChainState {
    AwaitingModel,
    ExecutingTools(Vec<ToolCall>),
    Done(String),
    Failed(ChainError),
}

impl ChainState {
    pub fn name(&self) -> &'static str {
        match self {
            ChainState::AwaitingModel => "awaiting_model",
            ChainState::ExecutingTools(_) => "executing_tools",
            ChainState::Done(_) => "done",
            ChainState::Failed(_) => "failed",
        }
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct ChainRun {
    pub run_id: String,
    pub answer: String,
    /// Model invocations made
    pub model_calls: u32,
    /// Tool calls executed
    pub tool_calls: usize,
    pub usage: TokenUsage,
    /// Full history, starting with the user query
    pub messages: Vec<Message>,
}

/// The tool-calling loop; immutable and shareable across concurrent queries
pub struct Chain {
    llm: Arc<dyn LlmClient>,
    executor: ToolExecutor,
    system_prompt: String,
    max_iterations: u32,
    max_tokens: u32,
}

impl Chain {
    pub fn new(llm: Arc<dyn LlmClient>, executor: ToolExecutor, config: &ChainConfig, max_tokens: u32) -> Self {
        debug!(provider = %llm.provider(), model = %llm.model(), max_iterations = %config.max_iterations, "Chain::new: called");
        Self {
            llm,
            executor: executor.with_parallel(config.parallel_tools),
            system_prompt: config.system_prompt.clone(),
            max_iterations: config.max_iterations.max(1),
            max_tokens,
        }
    }

    /// Tool schemas offered to the model
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.executor.definitions()
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Run a query and return only the final answer
    pub async fn invoke(&self, query: &str) -> Result<String, ChainError> {
        self.run(query).await.map(|run| run.answer)
    }

    /// Run a query to completion
    pub async fn run(&self, query: &str) -> Result<ChainRun, ChainError> {
        let query = query.trim();
        if query.is_empty() {
            debug!("run: empty query rejected");
            return Err(ChainError::EmptyQuery);
        }

        let run_id = Uuid::now_v7().to_string();
        let span = info_span!("chain_run", %run_id);
        self.run_inner(query, run_id).instrument(span).await
    }

    async fn run_inner(&self, query: &str, run_id: String) -> Result<ChainRun, ChainError> {
        let preview: String = query.chars().take(100).collect();
        info!(query = %preview, max_iterations = %self.max_iterations, "Chain run started");

        let tools = self.executor.definitions();
        let mut messages = vec![Message::user(query)];
        let mut usage = TokenUsage::default();
        let mut model_calls: u32 = 0;
        let mut tool_calls: usize = 0;
        let mut state = ChainState::AwaitingModel;

        loop {
            debug!(state = %state.name(), %model_calls, "run_inner: state");
            state = match state {
                ChainState::AwaitingModel => {
                    model_calls += 1;
                    let request = CompletionRequest {
                        system_prompt: self.system_prompt.clone(),
                        messages: messages.clone(),
                        tools: tools.clone(),
                        max_tokens: self.max_tokens,
                    };

                    match self.llm.complete(request).await {
                        Err(e) => {
                            warn!(%model_calls, error = %e, "Model invocation failed");
                            ChainState::Failed(ChainError::Llm(e))
                        }
                        Ok(response) => {
                            usage.add(&response.usage);
                            messages.push(response.to_message());

                            if !response.has_tool_calls() {
                                let answer = response
                                    .content
                                    .filter(|t| !t.trim().is_empty())
                                    .unwrap_or_else(|| NO_RESPONSE.to_string());
                                ChainState::Done(answer)
                            } else if model_calls >= self.max_iterations {
                                warn!(
                                    max_iterations = %self.max_iterations,
                                    pending = %response.tool_calls.len(),
                                    "Max iterations reached with tool calls still pending"
                                );
                                ChainState::Failed(ChainError::MaxIterations {
                                    max: self.max_iterations,
                                })
                            } else {
                                ChainState::ExecutingTools(response.tool_calls)
                            }
                        }
                    }
                }

                ChainState::ExecutingTools(calls) => {
                    info!(count = %calls.len(), iteration = %model_calls, "Executing tool calls");
                    let ctx = ToolContext::new(&run_id, model_calls);
                    let results = self.executor.execute_all(&calls, &ctx).await;
                    tool_calls += results.len();

                    for result in results {
                        messages.push(Message::tool_result(result.call_id, result.content, result.is_error));
                    }
                    ChainState::AwaitingModel
                }

                ChainState::Done(answer) => {
                    info!(%model_calls, %tool_calls, total_tokens = %usage.total(), "Chain run completed");
                    return Ok(ChainRun {
                        run_id,
                        answer,
                        model_calls,
                        tool_calls,
                        usage,
                        messages,
                    });
                }

                ChainState::Failed(err) => {
                    warn!(%model_calls, %tool_calls, error = %err, "Chain run failed");
                    return Err(err);
                }
            };
        }
    }
}
