//! Two-round completion with a single remote tool call
//!
//! Round 1 offers the registry's tools. If the model answers directly that
//! answer is final. If it asks for a tool, the first call is invoked over
//! JSON-RPC, the call and its result are appended to the conversation, and
//! round 2 runs without tools to produce the final text.

use std::sync::Arc;

use crate::logging::SharedLogger;
use crate::providers::{Provider, ProviderModelConfig, StreamChatOptions};
use crate::rpc::ToolClient;
use crate::tools::ToolRegistry;
use crate::types::{CancellationToken, ChatMessage, Completion, Tool, ToolCall, ToolChoice};

use super::error::{ChatError, ChatResult};

/// Final answer of a complete-mode request
#[derive(Debug, Clone, PartialEq)]
pub struct Finalized {
    /// Final text, verbatim from the provider
    pub text: String,
    /// The tool call that was invoked, if any
    pub tool_call: Option<ToolCall>,
}

/// Conversation ready for a streamed final round
#[derive(Debug, Clone)]
pub struct PreparedStream {
    /// Messages to send, including the tool round when one happened
    pub conversation: Vec<ChatMessage>,
    /// The tool call that was invoked, if any
    pub tool_call: Option<ToolCall>,
}

/// Outcome of round 1 plus the optional tool invocation
enum FirstRound {
    Answered(Completion),
    ToolUsed {
        conversation: Vec<ChatMessage>,
        call: ToolCall,
    },
}

/// Drives the completion rounds for one model against one tool endpoint
pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    model: ProviderModelConfig,
    tools: Vec<Tool>,
    tool_client: ToolClient,
    logger: SharedLogger,
}

impl Orchestrator {
    /// Create an orchestrator offering every tool in `registry`
    pub fn new(
        provider: Arc<dyn Provider>,
        model: ProviderModelConfig,
        registry: &ToolRegistry,
        tool_client: ToolClient,
        logger: SharedLogger,
    ) -> Self {
        Self {
            provider,
            model,
            tools: registry.definitions(),
            tool_client,
            logger,
        }
    }

    /// Tools offered on round 1
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub(crate) fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub(crate) fn model(&self) -> &ProviderModelConfig {
        &self.model
    }

    /// Run the conversation to a final text answer
    pub async fn complete(&self, messages: Vec<ChatMessage>) -> ChatResult<Finalized> {
        let cancel = CancellationToken::new();

        match self.first_round(messages, &cancel).await? {
            FirstRound::Answered(completion) => Ok(Finalized {
                text: completion.content,
                tool_call: None,
            }),
            FirstRound::ToolUsed { conversation, call } => {
                self.logger.debug(&format!(
                    "[Orchestrator] Round 2 with {} messages",
                    conversation.len()
                ));
                let completion = self
                    .provider
                    .complete(conversation, self.model.clone(), Self::final_round_options(), cancel)
                    .await?;

                if !completion.tool_calls.is_empty() {
                    self.logger.warn(&format!(
                        "[Orchestrator] Ignoring {} tool call(s) requested in round 2",
                        completion.tool_calls.len()
                    ));
                }

                Ok(Finalized {
                    text: completion.content,
                    tool_call: Some(call),
                })
            }
        }
    }

    /// Run round 1 (and the tool call, if requested) for a streamed answer
    ///
    /// The returned conversation is what the streamed final round should
    /// send. On the direct-answer path it is the caller's conversation
    /// unchanged.
    pub async fn prepare_stream(&self, messages: Vec<ChatMessage>) -> ChatResult<PreparedStream> {
        let cancel = CancellationToken::new();
        let original = messages.clone();

        match self.first_round(messages, &cancel).await? {
            FirstRound::Answered(_) => Ok(PreparedStream {
                conversation: original,
                tool_call: None,
            }),
            FirstRound::ToolUsed { conversation, call } => Ok(PreparedStream {
                conversation,
                tool_call: Some(call),
            }),
        }
    }

    /// Options for the final round: no tools offered
    pub(crate) fn final_round_options() -> StreamChatOptions {
        StreamChatOptions::new().with_tool_choice(ToolChoice::None)
    }

    async fn first_round(
        &self,
        messages: Vec<ChatMessage>,
        cancel: &CancellationToken,
    ) -> ChatResult<FirstRound> {
        if messages.is_empty() {
            return Err(ChatError::EmptyConversation);
        }

        let options = StreamChatOptions::new()
            .with_tools(self.tools.clone())
            .with_tool_choice(ToolChoice::Auto);

        self.logger.debug(&format!(
            "[Orchestrator] Round 1: {} messages, {} tools offered",
            messages.len(),
            self.tools.len()
        ));

        let completion = self
            .provider
            .complete(messages.clone(), self.model.clone(), options, cancel.clone())
            .await
            .map_err(|e| {
                self.logger
                    .error(&format!("[Orchestrator] Round 1 failed: {}", e));
                e
            })?;

        let Some(call) = completion.first_tool_call().cloned() else {
            self.logger.info("[Orchestrator] Direct answer, no tool requested");
            return Ok(FirstRound::Answered(completion));
        };

        if completion.tool_calls.len() > 1 {
            self.logger.warn(&format!(
                "[Orchestrator] Model requested {} tool calls; only '{}' will run",
                completion.tool_calls.len(),
                call.name
            ));
        }

        self.logger
            .info(&format!("[Orchestrator] Invoking tool '{}'", call.name));
        let result = self.tool_client.invoke(&call).await;

        let mut conversation = messages;
        conversation.push(ChatMessage::assistant_tool_calls(
            completion.content,
            vec![call.clone()],
        ));
        conversation.push(ChatMessage::tool(call.id.clone(), call.name.clone(), result));

        Ok(FirstRound::ToolUsed { conversation, call })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::providers::{MockProvider, MockTurn};
    use crate::rpc::{DEFAULT_TOOL_TIMEOUT, FALLBACK_PREFIX};
    use crate::testing::{closed_url, serve, tool_router};
    use crate::types::MessageRole;
    use serde_json::{json, Value};

    fn orchestrator(provider: Arc<MockProvider>, tool_url: String) -> Orchestrator {
        let registry = ToolRegistry::with_builtin_tools().unwrap();
        let client = ToolClient::new(tool_url, DEFAULT_TOOL_TIMEOUT, NoOpLogger::shared()).unwrap();
        Orchestrator::new(
            provider,
            ProviderModelConfig::new("gpt-4o"),
            &registry,
            client,
            NoOpLogger::shared(),
        )
    }

    fn time_call() -> ToolCall {
        ToolCall::new("call_abc", "get_current_time", json!({}))
    }

    #[tokio::test]
    async fn test_direct_answer_is_verbatim_and_single_round() {
        let provider = Arc::new(MockProvider::scripted(
            vec![MockTurn::text("  Hello there!\n")],
            NoOpLogger::shared(),
        ));
        let orch = orchestrator(provider.clone(), closed_url().await);

        let finalized = orch.complete(vec![ChatMessage::user("hi")]).await.unwrap();

        assert_eq!(finalized.text, "  Hello there!\n");
        assert_eq!(finalized.tool_call, None);
        assert_eq!(provider.call_count(), 1);

        let round1 = &provider.requests()[0];
        assert_eq!(round1.tool_names, vec!["calculate_discharge_date", "get_current_time"]);
        assert_eq!(round1.tool_choice, Some(ToolChoice::Auto));
    }

    #[tokio::test]
    async fn test_what_time_is_it() {
        let provider = Arc::new(MockProvider::scripted(
            vec![MockTurn::tool_call(time_call()), MockTurn::text("It is morning in Seoul.")],
            NoOpLogger::shared(),
        ));
        let base = serve(tool_router()).await;
        let orch = orchestrator(provider.clone(), format!("{}/mcp", base));

        let user = ChatMessage::user("What time is it?");
        let finalized = orch.complete(vec![user.clone()]).await.unwrap();

        assert_eq!(finalized.text, "It is morning in Seoul.");
        assert_eq!(finalized.tool_call, Some(time_call()));
        assert_eq!(provider.call_count(), 2);

        let round2 = &provider.requests()[1];
        assert!(round2.tool_names.is_empty());
        assert_eq!(round2.messages.len(), 3);
        assert_eq!(round2.messages[0], user);

        let assistant = &round2.messages[1];
        assert_eq!(assistant.role, MessageRole::Assistant);
        assert_eq!(assistant.tool_calls, vec![time_call()]);

        let tool_msg = &round2.messages[2];
        assert_eq!(tool_msg.role, MessageRole::Tool);
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_abc"));
        assert_eq!(tool_msg.name.as_deref(), Some("get_current_time"));
        let result: Value = serde_json::from_str(tool_msg.text().unwrap()).unwrap();
        assert!(result["time"].is_string());
    }

    #[tokio::test]
    async fn test_tool_transport_failure_still_finalizes() {
        let provider = Arc::new(MockProvider::scripted(
            vec![MockTurn::tool_call(time_call()), MockTurn::text("I could not check the time.")],
            NoOpLogger::shared(),
        ));
        let orch = orchestrator(provider.clone(), closed_url().await);

        let finalized = orch
            .complete(vec![ChatMessage::user("What time is it?")])
            .await
            .unwrap();

        assert_eq!(finalized.text, "I could not check the time.");
        let tool_msg = &provider.requests()[1].messages[2];
        assert!(tool_msg.text().unwrap().starts_with(FALLBACK_PREFIX));
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_fallback() {
        let call = ToolCall::new("call_x", "does_not_exist", json!({}));
        let provider = Arc::new(MockProvider::scripted(
            vec![MockTurn::tool_call(call), MockTurn::text("done")],
            NoOpLogger::shared(),
        ));
        let base = serve(tool_router()).await;
        let orch = orchestrator(provider.clone(), format!("{}/mcp", base));

        orch.complete(vec![ChatMessage::user("x")]).await.unwrap();

        let tool_text = provider.requests()[1].messages[2].text().unwrap().to_string();
        assert!(tool_text.starts_with(FALLBACK_PREFIX));
        assert!(tool_text.contains("Method not found"));
    }

    #[tokio::test]
    async fn test_only_first_tool_call_runs() {
        let second = ToolCall::new("call_2", "calculate_discharge_date", json!({}));
        let provider = Arc::new(MockProvider::scripted(
            vec![
                MockTurn::ToolCalls {
                    content: String::new(),
                    calls: vec![time_call(), second],
                },
                MockTurn::text("ok"),
            ],
            NoOpLogger::shared(),
        ));
        let base = serve(tool_router()).await;
        let orch = orchestrator(provider.clone(), format!("{}/mcp", base));

        let finalized = orch.complete(vec![ChatMessage::user("x")]).await.unwrap();

        assert_eq!(finalized.tool_call, Some(time_call()));
        let round2 = &provider.requests()[1].messages;
        assert_eq!(round2.len(), 3);
        assert_eq!(round2[1].tool_calls, vec![time_call()]);
    }

    #[tokio::test]
    async fn test_empty_conversation_makes_no_provider_call() {
        let provider = Arc::new(MockProvider::echo(NoOpLogger::shared()));
        let orch = orchestrator(provider.clone(), closed_url().await);

        let err = orch.complete(Vec::new()).await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyConversation));

        let err = orch.prepare_stream(Vec::new()).await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyConversation));

        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces() {
        let provider = Arc::new(MockProvider::scripted(
            vec![MockTurn::error("upstream unavailable")],
            NoOpLogger::shared(),
        ));
        let orch = orchestrator(provider, closed_url().await);

        let err = orch.complete(vec![ChatMessage::user("x")]).await.unwrap_err();
        assert!(matches!(err, ChatError::Provider(_)));
    }

    #[tokio::test]
    async fn test_round2_failure_surfaces() {
        let provider = Arc::new(MockProvider::scripted(
            vec![MockTurn::tool_call(time_call()), MockTurn::error("overloaded")],
            NoOpLogger::shared(),
        ));
        let base = serve(tool_router()).await;
        let orch = orchestrator(provider, format!("{}/mcp", base));

        let err = orch.complete(vec![ChatMessage::user("x")]).await.unwrap_err();
        assert!(matches!(err, ChatError::Provider(_)));
    }

    #[tokio::test]
    async fn test_null_round2_content_is_empty_text() {
        let provider = Arc::new(MockProvider::scripted(
            vec![MockTurn::tool_call(time_call()), MockTurn::text("")],
            NoOpLogger::shared(),
        ));
        let base = serve(tool_router()).await;
        let orch = orchestrator(provider, format!("{}/mcp", base));

        let finalized = orch.complete(vec![ChatMessage::user("x")]).await.unwrap();
        assert_eq!(finalized.text, "");
    }

    #[tokio::test]
    async fn test_prepare_stream_direct_keeps_conversation() {
        let provider = Arc::new(MockProvider::scripted(
            vec![MockTurn::text("hello")],
            NoOpLogger::shared(),
        ));
        let orch = orchestrator(provider, closed_url().await);
        let messages = vec![ChatMessage::system("Be brief."), ChatMessage::user("hi")];

        let prepared = orch.prepare_stream(messages.clone()).await.unwrap();

        assert_eq!(prepared.conversation, messages);
        assert!(prepared.tool_call.is_none());
    }
}
