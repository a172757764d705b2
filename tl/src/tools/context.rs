//! ToolContext - execution context for tools

use tracing::debug;

/// Execution context for tools - scoped to a single chain run
///
/// Carries identifiers only; tools use it to tag their logs.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolContext {
    /// Chain run id
    pub run_id: String,

    /// Model invocation that requested the current batch of calls (1-based)
    pub iteration: u32,
}

impl ToolContext {
    pub fn new(run_id: impl Into<String>, iteration: u32) -> Self {
        let run_id = run_id.into();
        debug!(%run_id, %iteration, "ToolContext::new: called");
        Self { run_id, iteration }
    }
}

impl Default for ToolContext {
    fn default() -> Self {
        Self::new("adhoc", 0)
    }
}
