//! Core types for LLM interactions
//!
//! This module contains the conversation, tool and streaming types shared
//! by the providers, the JSON-RPC layer and the orchestrator.

mod message;
mod tool;
mod stream;
mod cancellation;

pub use message::{ChatMessage, MessageRole};
pub use tool::{Tool, ToolCall, ToolChoice};
pub use stream::{Completion, StreamChunk};
pub use cancellation::{CancellationToken, DropGuard};
