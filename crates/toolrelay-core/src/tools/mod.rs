//! Tool registry and built-in tools
//!
//! The registry is the single source of truth for tools: the dispatcher
//! serves it over JSON-RPC and the orchestrator offers its definitions to
//! the LLM.

mod builtin;
mod registry;

pub use builtin::{calculate_discharge_date, get_current_time};
pub use registry::{HandlerResult, ToolEntry, ToolError, ToolHandler, ToolRegistry};
