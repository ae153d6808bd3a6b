//! Mock provider for testing
//!
//! Plays back a script of turns without network access. Each provider call
//! consumes one turn; once the script runs out the provider echoes the last
//! user message. Every request is recorded so tests can inspect what the
//! orchestrator actually sent.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

use super::error::{ProviderError, ProviderResult};
use super::traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
use crate::logging::SharedLogger;
use crate::types::{CancellationToken, ChatMessage, MessageRole, StreamChunk, ToolCall, ToolChoice};

/// One scripted provider response
#[derive(Debug, Clone)]
pub enum MockTurn {
    /// Plain text answer
    Text(String),
    /// Tool calls, optionally preceded by text
    ToolCalls {
        content: String,
        calls: Vec<ToolCall>,
    },
    /// Fail before any chunk is produced
    Error(String),
    /// Yield the given chunks, then fail mid-stream
    FailAfter {
        chunks: Vec<String>,
        message: String,
    },
}

impl MockTurn {
    /// Text answer
    pub fn text(content: impl Into<String>) -> Self {
        MockTurn::Text(content.into())
    }

    /// A single tool call with no accompanying text
    pub fn tool_call(call: ToolCall) -> Self {
        MockTurn::ToolCalls {
            content: String::new(),
            calls: vec![call],
        }
    }

    /// Start-of-stream failure
    pub fn error(message: impl Into<String>) -> Self {
        MockTurn::Error(message.into())
    }
}

/// What the provider was asked to do on one call
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Conversation sent to the provider
    pub messages: Vec<ChatMessage>,
    /// Names of the tools actually offered
    pub tool_names: Vec<String>,
    /// Requested tool choice
    pub tool_choice: Option<ToolChoice>,
    /// Model requested
    pub model: String,
}

/// Configuration for the mock provider
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Delay between chunks in milliseconds (0 = no delay)
    pub chunk_delay_ms: u64,
    /// Size of each chunk when splitting text (0 = one chunk)
    pub chunk_size: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            chunk_delay_ms: 0,
            chunk_size: 10,
        }
    }
}

/// Mock LLM provider for testing
pub struct MockProvider {
    config: MockConfig,
    turns: Mutex<VecDeque<MockTurn>>,
    requests: Mutex<Vec<RecordedRequest>>,
    logger: SharedLogger,
}

impl MockProvider {
    /// Create a provider that echoes the last user message
    pub fn echo(logger: SharedLogger) -> Self {
        Self::scripted(Vec::new(), logger)
    }

    /// Create a provider that plays back the given turns in order
    pub fn scripted(turns: Vec<MockTurn>, logger: SharedLogger) -> Self {
        Self {
            config: MockConfig::default(),
            turns: Mutex::new(turns.into()),
            requests: Mutex::new(Vec::new()),
            logger,
        }
    }

    /// Set chunk delay
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.config.chunk_delay_ms = delay_ms;
        self
    }

    /// Set chunk size for splitting responses
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Number of stream_chat calls made so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// All requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    fn last_user_message(messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .rev()
            .filter(|msg| msg.role == MessageRole::User)
            .find_map(|msg| msg.text().filter(|text| !text.is_empty()))
            .unwrap_or("Hello from MockProvider!")
            .to_string()
    }

    fn split_into_chunks(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        if self.config.chunk_size == 0 {
            return vec![text.to_string()];
        }

        text.chars()
            .collect::<Vec<_>>()
            .chunks(self.config.chunk_size)
            .map(|c| c.iter().collect())
            .collect()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        model: ProviderModelConfig,
        options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse> {
        let tool_names = options
            .effective_tools()
            .map(|tools| tools.iter().map(|t| t.name.clone()).collect())
            .unwrap_or_default();

        self.requests.lock().push(RecordedRequest {
            messages: messages.clone(),
            tool_names,
            tool_choice: options.tool_choice,
            model: model.model,
        });

        if cancel_token.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        let turn = self.turns.lock().pop_front();
        let mut items: Vec<ProviderResult<StreamChunk>> = Vec::new();

        match turn {
            None => {
                let echoed = format!("Echo: {}", Self::last_user_message(&messages));
                self.logger
                    .debug(&format!("[MockProvider] Echoing {} chars", echoed.len()));
                items.extend(self.split_into_chunks(&echoed).into_iter().map(|c| Ok(StreamChunk::text(c))));
            }
            Some(MockTurn::Text(content)) => {
                items.extend(self.split_into_chunks(&content).into_iter().map(|c| Ok(StreamChunk::text(c))));
            }
            Some(MockTurn::ToolCalls { content, calls }) => {
                self.logger
                    .debug(&format!("[MockProvider] Requesting {} tool call(s)", calls.len()));
                items.extend(self.split_into_chunks(&content).into_iter().map(|c| Ok(StreamChunk::text(c))));
                items.extend(calls.into_iter().map(|call| Ok(StreamChunk::tool_call(call))));
            }
            Some(MockTurn::Error(message)) => {
                return Err(ProviderError::api_error("mock", 500, message));
            }
            Some(MockTurn::FailAfter { chunks, message }) => {
                items.extend(chunks.into_iter().map(|c| Ok(StreamChunk::text(c))));
                items.push(Err(ProviderError::api_error("mock", 500, message)));
            }
        }

        let delay_ms = self.config.chunk_delay_ms;

        let stream = stream::iter(items.into_iter().enumerate()).then(move |(i, item)| {
            let cancel = cancel_token.clone();
            async move {
                if i > 0 && delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                if cancel.is_cancelled() {
                    return Err(ProviderError::Cancelled);
                }
                item
            }
        });

        Ok(Box::pin(stream))
    }
}
