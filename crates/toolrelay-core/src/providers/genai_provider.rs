//! GenaiProvider - chat completions through the genai crate
//!
//! Handles every genai-native backend, plus any OpenAI-compatible endpoint
//! when an `api_base` is configured.

use async_trait::async_trait;
use futures::{stream, StreamExt};

use genai::chat::{ChatRequest, ChatStreamEvent};

use crate::logging::SharedLogger;
use crate::types::{CancellationToken, ChatMessage, StreamChunk};

use super::error::{ProviderError, ProviderResult};
use super::genai_adapter::{
    create_client, from_genai_event, to_genai_messages, to_genai_options, to_genai_tools,
    ProviderConfig,
};
use super::traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};

/// Provider backed by genai
pub struct GenaiProvider {
    provider_id: String,
    logger: SharedLogger,
}

impl GenaiProvider {
    /// Create a new GenaiProvider
    pub fn new(provider_id: impl Into<String>, logger: SharedLogger) -> Self {
        Self {
            provider_id: provider_id.into(),
            logger,
        }
    }

    /// Extract model name from a model string (e.g., "openai/gpt-4o" -> "gpt-4o")
    pub fn extract_model_name(model: &str) -> &str {
        model.split_once('/').map(|(_, name)| name).unwrap_or(model)
    }

    fn api_error(&self, err: impl ToString) -> ProviderError {
        ProviderError::api_error(self.provider_id.clone(), 500, err.to_string())
    }
}

#[async_trait]
impl Provider for GenaiProvider {
    fn name(&self) -> &str {
        &self.provider_id
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        model_config: ProviderModelConfig,
        options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse> {
        if cancel_token.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        let model_name = Self::extract_model_name(&model_config.model);
        self.logger.debug(&format!(
            "[GenaiProvider] stream_chat: provider={}, model={}, messages={}",
            self.provider_id,
            model_name,
            messages.len()
        ));

        let client = create_client(&ProviderConfig {
            provider: self.provider_id.clone(),
            api_key: model_config.api_key.clone(),
            api_base: model_config.api_base.clone(),
        });

        let mut chat_req = ChatRequest::new(to_genai_messages(messages)?);
        if let Some(tools) = options.effective_tools() {
            chat_req = chat_req.with_tools(to_genai_tools(tools));
        }

        let genai_options = to_genai_options();

        let chat_stream = client
            .exec_chat_stream(model_name, chat_req, Some(&genai_options))
            .await
            .map_err(|e| {
                self.logger
                    .error(&format!("[GenaiProvider] Failed to start stream: {}", e));
                self.api_error(e)
            })?;

        self.logger.debug("[GenaiProvider] Stream started");

        let cancel = cancel_token.clone();
        let logger = self.logger.clone();
        let provider_id = self.provider_id.clone();

        let chunks = chat_stream
            .stream
            .map(move |result| -> Vec<ProviderResult<StreamChunk>> {
                if cancel.is_cancelled() {
                    logger.info("[GenaiProvider] Stream cancelled");
                    return vec![Err(ProviderError::Cancelled)];
                }

                match result {
                    Ok(event) => {
                        if let ChatStreamEvent::End(_) = &event {
                            logger.debug("[GenaiProvider] Stream event: End");
                        }
                        from_genai_event(event).into_iter().map(Ok).collect()
                    }
                    Err(e) => {
                        logger.error(&format!("[GenaiProvider] Stream error: {}", e));
                        vec![Err(ProviderError::api_error(
                            provider_id.clone(),
                            500,
                            e.to_string(),
                        ))]
                    }
                }
            })
            .flat_map(stream::iter);

        Ok(Box::pin(chunks))
    }
}
