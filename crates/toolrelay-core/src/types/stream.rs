//! Streaming response types

use serde::{Deserialize, Serialize};
use super::tool::ToolCall;

/// Streaming chunk from an LLM response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamChunk {
    /// Text content chunk
    Text {
        text: String,
    },
    /// Complete tool call
    ToolCall {
        #[serde(rename = "toolCall")]
        tool_call: ToolCall,
    },
    /// Partial tool call (for streaming tool arguments)
    ToolCallDelta {
        id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(rename = "inputDelta", skip_serializing_if = "Option::is_none")]
        input_delta: Option<String>,
    },
}

impl StreamChunk {
    /// Create a text chunk
    pub fn text(text: impl Into<String>) -> Self {
        StreamChunk::Text { text: text.into() }
    }

    /// Create a tool call chunk
    pub fn tool_call(tool_call: ToolCall) -> Self {
        StreamChunk::ToolCall { tool_call }
    }

    /// Get the text content if this is a text chunk
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StreamChunk::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Result of one non-streaming completion round
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    /// Generated text (empty when the model only requested tools)
    pub content: String,
    /// Tool calls requested by the model, in provider order
    pub tool_calls: Vec<ToolCall>,
}

impl Completion {
    /// Fold a streamed chunk into this completion
    ///
    /// Tool call deltas are ignored; providers emit the assembled call as a
    /// `ToolCall` chunk once arguments are complete.
    pub fn push(&mut self, chunk: StreamChunk) {
        match chunk {
            StreamChunk::Text { text } => self.content.push_str(&text),
            StreamChunk::ToolCall { tool_call } => self.tool_calls.push(tool_call),
            StreamChunk::ToolCallDelta { .. } => {}
        }
    }

    /// The first requested tool call, if any
    pub fn first_tool_call(&self) -> Option<&ToolCall> {
        self.tool_calls.first()
    }
}
