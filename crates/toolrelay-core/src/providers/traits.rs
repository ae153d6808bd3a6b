//! Provider trait definition

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::pin::Pin;

use crate::types::{CancellationToken, ChatMessage, Completion, StreamChunk, Tool, ToolChoice};
use super::error::ProviderResult;

/// Model configuration for provider requests
#[derive(Debug, Clone)]
pub struct ProviderModelConfig {
    /// Model identifier as used by the provider's API
    pub model: String,
    /// API key for authentication
    pub api_key: Option<String>,
    /// Custom API base URL
    pub api_base: Option<String>,
}

impl ProviderModelConfig {
    /// Create a new model config
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            api_base: None,
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }
}

/// Options for chat requests
#[derive(Debug, Clone, Default)]
pub struct StreamChatOptions {
    /// Tools available for the model to use
    pub tools: Option<Vec<Tool>>,
    /// Tool choice behavior
    pub tool_choice: Option<ToolChoice>,
}

impl StreamChatOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set tools
    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Set tool choice
    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }

    /// Tools that should actually be sent to the provider
    ///
    /// `ToolChoice::None` suppresses the tool list entirely, which every
    /// supported backend honors even when it has no native tool_choice knob.
    pub fn effective_tools(&self) -> Option<&[Tool]> {
        if self.tool_choice == Some(ToolChoice::None) {
            return None;
        }
        self.tools.as_deref().filter(|tools| !tools.is_empty())
    }
}

/// Type alias for the streaming response
pub type StreamResponse = Pin<Box<dyn Stream<Item = ProviderResult<StreamChunk>> + Send>>;

/// Provider trait for LLM implementations
///
/// Each backend implements `stream_chat`; the non-streaming `complete` round
/// used for tool-call decisions is derived from it by draining the stream.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name (e.g., "openai", "mock")
    fn name(&self) -> &str;

    /// Stream a chat completion
    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        model: ProviderModelConfig,
        options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse>;

    /// Run a chat completion to the end and return text plus tool calls
    ///
    /// Any error, whether at stream start or mid-stream, fails the round.
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        model: ProviderModelConfig,
        options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<Completion> {
        let mut stream = self
            .stream_chat(messages, model, options, cancel_token)
            .await?;

        let mut completion = Completion::default();
        while let Some(chunk) = stream.next().await {
            completion.push(chunk?);
        }

        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_tools_respects_choice() {
        let tools = vec![Tool::new("get_current_time", "Current time")];

        let auto = StreamChatOptions::new()
            .with_tools(tools.clone())
            .with_tool_choice(ToolChoice::Auto);
        assert_eq!(auto.effective_tools().map(|t| t.len()), Some(1));

        let none = StreamChatOptions::new()
            .with_tools(tools)
            .with_tool_choice(ToolChoice::None);
        assert!(none.effective_tools().is_none());

        let empty = StreamChatOptions::new().with_tools(vec![]);
        assert!(empty.effective_tools().is_none());
    }

    #[test]
    fn test_model_config_builder() {
        let config = ProviderModelConfig::new("gpt-4o")
            .with_api_key("sk-test")
            .with_api_base("http://localhost:8080/v1/");

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.api_base.as_deref(), Some("http://localhost:8080/v1/"));
    }
}
