//! Conversions between toolrelay types and genai types
//!
//! genai owns the wire protocol and SSE parsing for every backend. This module
//! maps our conversation model onto it, including the assistant tool-call
//! message and the tool-role result that make up the second round.

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, ChatRole as GenaiRole,
    ChatStreamEvent, Tool as GenaiTool, ToolCall as GenaiToolCall,
    ToolResponse as GenaiToolResponse,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};
use serde_json::json;

use crate::types::{ChatMessage, MessageRole, StreamChunk, Tool, ToolCall};

use super::error::{ProviderError, ProviderResult};

// ============================================================================
// Message Conversion: toolrelay -> genai
// ============================================================================

/// Convert a MessageRole to genai ChatRole
pub fn to_genai_role(role: MessageRole) -> GenaiRole {
    match role {
        MessageRole::System => GenaiRole::System,
        MessageRole::User => GenaiRole::User,
        MessageRole::Assistant => GenaiRole::Assistant,
        MessageRole::Tool => GenaiRole::Tool,
    }
}

/// Convert a ToolCall into genai's representation
pub fn to_genai_tool_call(call: &ToolCall) -> ProviderResult<GenaiToolCall> {
    let raw = json!({
        "call_id": call.id,
        "fn_name": call.name,
        "fn_arguments": call.input,
    });
    Ok(serde_json::from_value(raw)?)
}

/// Convert a ChatMessage to genai ChatMessage
pub fn to_genai_message(msg: ChatMessage) -> ProviderResult<GenaiMessage> {
    let text = msg.content.unwrap_or_default();

    let converted = match msg.role {
        MessageRole::System => GenaiMessage::system(text),
        MessageRole::User => GenaiMessage::user(text),
        MessageRole::Assistant if msg.tool_calls.is_empty() => GenaiMessage::assistant(text),
        MessageRole::Assistant => {
            let calls = msg
                .tool_calls
                .iter()
                .map(to_genai_tool_call)
                .collect::<ProviderResult<Vec<_>>>()?;
            GenaiMessage::from(calls)
        }
        MessageRole::Tool => {
            let call_id = msg.tool_call_id.ok_or_else(|| {
                ProviderError::Other("tool message is missing tool_call_id".to_string())
            })?;
            GenaiMessage::from(GenaiToolResponse::new(call_id, text))
        }
    };

    Ok(converted)
}

/// Convert a conversation to genai messages
pub fn to_genai_messages(messages: Vec<ChatMessage>) -> ProviderResult<Vec<GenaiMessage>> {
    messages.into_iter().map(to_genai_message).collect()
}

// ============================================================================
// Tool Conversion: toolrelay -> genai
// ============================================================================

/// Convert a Tool definition to genai Tool
pub fn to_genai_tool(tool: &Tool) -> GenaiTool {
    let mut genai_tool = GenaiTool::new(&tool.name).with_description(&tool.description);

    if let Some(schema) = &tool.input_schema {
        genai_tool = genai_tool.with_schema(schema.clone());
    }

    genai_tool
}

/// Convert tool definitions to genai tools
pub fn to_genai_tools(tools: &[Tool]) -> Vec<GenaiTool> {
    tools.iter().map(to_genai_tool).collect()
}

// ============================================================================
// Options Conversion: toolrelay -> genai
// ============================================================================

/// genai ChatOptions for every request
pub fn to_genai_options() -> GenaiOptions {
    // Tool calls are only surfaced at End when captured
    GenaiOptions::default().with_capture_tool_calls(true)
}

// ============================================================================
// Response Conversion: genai -> toolrelay
// ============================================================================

/// Convert genai ToolCall to ToolCall
pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolCall {
    ToolCall::new(tc.call_id.clone(), tc.fn_name.clone(), tc.fn_arguments.clone())
}

/// Convert a genai stream event to a StreamChunk
///
/// Captured tool calls are emitted in provider order when the stream ends.
pub fn from_genai_event(event: ChatStreamEvent) -> Vec<StreamChunk> {
    match event {
        ChatStreamEvent::Chunk(chunk) if !chunk.content.is_empty() => {
            vec![StreamChunk::text(chunk.content)]
        }
        ChatStreamEvent::ToolCallChunk(chunk) => vec![StreamChunk::ToolCallDelta {
            id: chunk.tool_call.call_id,
            name: Some(chunk.tool_call.fn_name),
            input_delta: Some(chunk.tool_call.fn_arguments.to_string()),
        }],
        ChatStreamEvent::End(end) => end
            .captured_tool_calls()
            .map(|calls| {
                calls
                    .iter()
                    .map(|tc| StreamChunk::tool_call(from_genai_tool_call(tc)))
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

// ============================================================================
// Client Creation
// ============================================================================

/// Connection settings for a genai client
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider identifier (e.g., "openai", "ollama")
    pub provider: String,
    /// API key for authentication
    pub api_key: Option<String>,
    /// Custom API base URL, spoken to with the OpenAI protocol
    pub api_base: Option<String>,
}

/// Create a genai Client using an explicit key and optional endpoint override
///
/// The key comes from the service's secret lookup, never from genai's own
/// environment probing.
pub fn create_client(config: &ProviderConfig) -> Client {
    let explicit_key = config.api_key.clone();

    let auth_resolver = AuthResolver::from_resolver_fn(
        move |_model_iden: ModelIden| -> Result<Option<AuthData>, genai::resolver::Error> {
            Ok(explicit_key.clone().map(AuthData::from_single))
        },
    );

    let api_base = config.api_base.clone();

    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let Some(base) = api_base.as_ref() else {
                return Ok(target);
            };

            let model = ModelIden::new(AdapterKind::OpenAI, target.model.model_name.clone());
            Ok(ServiceTarget {
                endpoint: Endpoint::from_owned(base.clone()),
                auth: target.auth,
                model,
            })
        },
    );

    Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build()
}

/// Check if a provider is natively supported by genai
pub fn is_genai_native(provider: &str) -> bool {
    matches!(
        provider.to_lowercase().as_str(),
        "openai"
            | "anthropic"
            | "gemini"
            | "ollama"
            | "groq"
            | "xai"
            | "deepseek"
            | "cohere"
            | "fireworks"
            | "together"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_conversion() {
        assert!(matches!(to_genai_role(MessageRole::System), GenaiRole::System));
        assert!(matches!(to_genai_role(MessageRole::User), GenaiRole::User));
        assert!(matches!(to_genai_role(MessageRole::Tool), GenaiRole::Tool));
    }

    #[test]
    fn test_user_message_conversion() {
        let genai_msg = to_genai_message(ChatMessage::user("What time is it?")).unwrap();
        assert!(matches!(genai_msg.role, GenaiRole::User));
    }

    #[test]
    fn test_tool_round_conversion() {
        let call = ToolCall::new("call_1", "get_current_time", json!({}));
        let assistant = ChatMessage::assistant_tool_calls("", vec![call]);
        let result = ChatMessage::tool("call_1", "get_current_time", "{\"time\":\"2024-05-01 09:00:00\"}");

        let converted = to_genai_messages(vec![assistant, result]).unwrap();
        assert!(matches!(converted[0].role, GenaiRole::Assistant));
        assert!(matches!(converted[1].role, GenaiRole::Tool));
    }

    #[test]
    fn test_tool_message_requires_call_id() {
        let mut orphan = ChatMessage::tool("call_1", "get_current_time", "x");
        orphan.tool_call_id = None;
        assert!(to_genai_message(orphan).is_err());
    }

    #[test]
    fn test_tool_conversion() {
        let tool = Tool::new("calculate_discharge_date", "Add days to a date")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "start_date": { "type": "string" },
                    "service_days": { "type": "integer" }
                }
            }));

        let genai_tool = to_genai_tool(&tool);
        assert_eq!(genai_tool.name, "calculate_discharge_date");
    }

    #[test]
    fn test_tool_call_round_trip_fields() {
        let call = ToolCall::new("call_7", "calculate_discharge_date", json!({"service_days": 3}));
        let genai_call = to_genai_tool_call(&call).unwrap();
        assert_eq!(genai_call.call_id, "call_7");
        assert_eq!(from_genai_tool_call(&genai_call), call);
    }

    #[test]
    fn test_provider_detection() {
        assert!(is_genai_native("openai"));
        assert!(is_genai_native("OpenAI"));
        assert!(!is_genai_native("mock"));
    }
}
