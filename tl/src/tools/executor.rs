//! ToolExecutor - runs model-requested tool calls
//!
//! The executor is the error boundary between tools and the chain: every
//! call produces exactly one `ToolResult`, whether the tool succeeded,
//! returned an error, received bad arguments, or panicked.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

use crate::llm::{ToolCall, ToolDefinition};

use super::schema::coerce_arguments;
use super::{ToolContext, ToolError, ToolRegistry, ToolResult};

/// Runs tool calls against a registry
pub struct ToolExecutor {
    registry: ToolRegistry,
    parallel: bool,
}

impl ToolExecutor {
    /// Executor that runs the calls of one turn sequentially
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            parallel: false,
        }
    }

    /// Run the calls of one turn concurrently instead
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Get tool definitions for LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    /// Execute a single tool call; never fails
    pub async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> ToolResult {
        debug!(call_id = %call.id, tool = %call.name, iteration = %ctx.iteration, "execute: called");

        let outcome = AssertUnwindSafe(self.try_execute(call, ctx))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(ToolError::Panicked(panic_message(panic.as_ref()))));

        match outcome {
            Ok(Value::String(text)) => {
                debug!(tool = %call.name, "execute: success");
                ToolResult::success(&call.id, text)
            }
            Ok(value) => ToolResult::success(&call.id, value.to_string()),
            Err(e) => {
                warn!(call_id = %call.id, tool = %call.name, error = %e, "execute: tool failed");
                let message = format!("Error executing tool {}: {}", call.name, e);
                ToolResult::error(&call.id, serde_json::json!({ "error": message }).to_string())
            }
        }
    }

    async fn try_execute(&self, call: &ToolCall, ctx: &ToolContext) -> Result<Value, ToolError> {
        let tool = self.registry.get(&call.name)?;
        let input = coerce_arguments(&tool.input_schema(), call.input.clone())?;
        tool.execute(input, ctx).await
    }

    /// Execute every call of one model turn
    ///
    /// Results come back in request order regardless of execution mode.
    pub async fn execute_all(&self, calls: &[ToolCall], ctx: &ToolContext) -> Vec<ToolResult> {
        debug!(call_count = %calls.len(), parallel = %self.parallel, "execute_all: called");
        if self.parallel {
            return join_all(calls.iter().map(|call| self.execute(call, ctx))).await;
        }

        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            results.push(self.execute(call, ctx).await);
        }
        results
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::Tool;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Echo the text argument"
        }

        fn input_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": { "text": { "type": "string" }, "times": { "type": "integer" } },
                "required": ["text"]
            })
        }

        async fn execute(&self, input: Value, _ctx: &ToolContext) -> Result<Value, ToolError> {
            if input.get("times").is_some() {
                return Ok(json!({ "text": input["text"], "times": input["times"] }));
            }
            Ok(input["text"].clone())
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &'static str {
            "fail"
        }

        fn description(&self) -> &'static str {
            "Always fails"
        }

        fn input_schema(&self) -> Value {
            json!({ "type": "object", "properties": {} })
        }

        async fn execute(&self, _input: Value, _ctx: &ToolContext) -> Result<Value, ToolError> {
            Err(ToolError::InvalidArgument("nothing works".to_string()))
        }
    }

    struct PanickingTool;

    #[async_trait]
    impl Tool for PanickingTool {
        fn name(&self) -> &'static str {
            "panic"
        }

        fn description(&self) -> &'static str {
            "Panics"
        }

        fn input_schema(&self) -> Value {
            json!({ "type": "object", "properties": {} })
        }

        async fn execute(&self, _input: Value, _ctx: &ToolContext) -> Result<Value, ToolError> {
            panic!("tool blew up");
        }
    }

    /// Sleeps longer for earlier calls so concurrent completion order is reversed
    struct SlowTool {
        running: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Tool for SlowTool {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn description(&self) -> &'static str {
            "Sleeps"
        }

        fn input_schema(&self) -> Value {
            json!({ "type": "object", "properties": { "ms": { "type": "integer" } }, "required": ["ms"] })
        }

        async fn execute(&self, input: Value, _ctx: &ToolContext) -> Result<Value, ToolError> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(input["ms"].as_u64().unwrap_or(0))).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            Ok(input["ms"].clone())
        }
    }

    fn executor() -> ToolExecutor {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        registry.register(Box::new(FailingTool));
        registry.register(Box::new(PanickingTool));
        ToolExecutor::new(registry)
    }

    fn call(id: &str, name: &str, input: Value) -> ToolCall {
        ToolCall::new(id, name, input)
    }

    #[tokio::test]
    async fn test_string_payload_passes_through() {
        let result = executor()
            .execute(&call("c1", "echo", json!({"text": "hi"})), &ToolContext::default())
            .await;
        assert_eq!(result, ToolResult::success("c1", "hi"));
    }

    #[tokio::test]
    async fn test_structured_payload_is_json() {
        let result = executor()
            .execute(&call("c1", "echo", json!({"text": "hi", "times": "2"})), &ToolContext::default())
            .await;
        assert!(!result.is_error);
        let parsed: Value = serde_json::from_str(&result.content).unwrap();
        assert_eq!(parsed, json!({"text": "hi", "times": 2}));
    }

    #[tokio::test]
    async fn test_tool_error_becomes_error_result() {
        let result = executor()
            .execute(&call("c9", "fail", json!({})), &ToolContext::default())
            .await;
        assert!(result.is_error);
        assert_eq!(result.call_id, "c9");
        let parsed: Value = serde_json::from_str(&result.content).unwrap();
        assert_eq!(parsed["error"], "Error executing tool fail: Invalid argument: nothing works");
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let result = executor()
            .execute(&call("c2", "panic", json!({})), &ToolContext::default())
            .await;
        assert!(result.is_error);
        assert!(result.content.contains("Tool panicked: tool blew up"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_result() {
        let result = executor()
            .execute(&call("c3", "download_video", json!({})), &ToolContext::default())
            .await;
        assert!(result.is_error);
        assert!(result.content.contains("Tool 'download_video' not found. Available tools: echo, fail, panic"));
    }

    #[tokio::test]
    async fn test_missing_required_argument_is_error_result() {
        let result = executor()
            .execute(&call("c4", "echo", json!({})), &ToolContext::default())
            .await;
        assert!(result.is_error);
        assert!(result.content.contains("missing required parameter 'text'"));
    }

    #[tokio::test]
    async fn test_execute_all_keeps_request_order_and_ids() {
        let calls = vec![
            call("a", "echo", json!({"text": "1"})),
            call("b", "fail", json!({})),
            call("c", "echo", json!({"text": "3"})),
        ];
        let results = executor().execute_all(&calls, &ToolContext::default()).await;

        let ids: Vec<&str> = results.iter().map(|r| r.call_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(results[1].is_error);
        assert_eq!(results[2].content, "3");
    }

    #[tokio::test]
    async fn test_parallel_mode_runs_concurrently_in_order() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(SlowTool {
            running: running.clone(),
            peak: peak.clone(),
        }));
        let executor = ToolExecutor::new(registry).with_parallel(true);

        let calls = vec![
            call("first", "slow", json!({"ms": 60})),
            call("second", "slow", json!({"ms": 30})),
            call("third", "slow", json!({"ms": 1})),
        ];
        let results = executor.execute_all(&calls, &ToolContext::default()).await;

        let ids: Vec<&str> = results.iter().map(|r| r.call_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
        assert_eq!(results[0].content, "60");
        assert!(peak.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn test_sequential_mode_runs_one_at_a_time() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(SlowTool {
            running: running.clone(),
            peak: peak.clone(),
        }));
        let executor = ToolExecutor::new(registry);

        let calls = vec![call("x", "slow", json!({"ms": 5})), call("y", "slow", json!({"ms": 5}))];
        executor.execute_all(&calls, &ToolContext::default()).await;
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }
}
