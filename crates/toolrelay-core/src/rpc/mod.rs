//! JSON-RPC tool endpoint
//!
//! Both sides of the tool wire contract:
//!
//! - [`Dispatcher`]: resolves a request against the tool registry, validates
//!   params and runs the handler (served at `/mcp`).
//! - [`ToolClient`]: POSTs a request for a model-issued tool call and turns
//!   the outcome into text for the conversation.
//!
//! ```rust,ignore
//! let client = ToolClient::new(url, DEFAULT_TOOL_TIMEOUT, logger)?;
//! let text = client.invoke(&tool_call).await; // never fails
//! ```

mod client;
mod dispatcher;
mod error;
mod protocol;

pub use client::{render_result, ToolClient, DEFAULT_TOOL_TIMEOUT, FALLBACK_PREFIX};
pub use dispatcher::Dispatcher;
pub use error::{RpcError, RpcResult};
pub use protocol::{error_codes, JsonRpcError, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION};
