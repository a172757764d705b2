//! Tool system for the tubeloop chain
//!
//! The registry maps tool names to implementations, and the executor turns
//! model-requested calls into `ToolResult`s without ever failing.

mod context;
mod error;
mod executor;
mod registry;
mod schema;
mod traits;

pub mod builtin;

pub use context::ToolContext;
pub use error::ToolError;
pub use executor::ToolExecutor;
pub use registry::ToolRegistry;
pub use schema::coerce_arguments;
pub use traits::{Tool, ToolResult};
