//! toolrelay core
//!
//! Two-phase completion orchestration with remote tool calls.
//! A conversation goes to the LLM with the registered tools offered; if the
//! model asks for a tool, the call is sent to a JSON-RPC endpoint and the
//! result is fed back for a final, tool-free answer. The answer is delivered
//! complete (optionally with synthesized speech) or as a text stream.
//!
//! ```rust,ignore
//! use toolrelay_core::{Delivery, Orchestrator, ToolClient, ToolRegistry};
//!
//! let registry = ToolRegistry::with_builtin_tools()?;
//! let client = ToolClient::new(url, DEFAULT_TOOL_TIMEOUT, logger.clone())?;
//! let orchestrator = Orchestrator::new(provider, model, &registry, client, logger.clone());
//!
//! let finalized = orchestrator.complete(messages).await?;
//! println!("{}", finalized.text);
//! ```

pub mod chat;
pub mod config;
pub mod logging;
pub mod providers;
pub mod rpc;
pub mod secrets;
pub mod speech;
pub mod tools;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use types::{
    CancellationToken, ChatMessage, Completion, MessageRole, StreamChunk, Tool, ToolCall,
    ToolChoice,
};

pub use logging::{Logger, NoOpLogger, SharedLogger, TracingLogger};

pub use secrets::{EnvSecretStore, MemorySecretStore, SecretStore, SecretStoreError};

pub use config::{ConfigError, ConfigResult, ServiceConfig};

pub use providers::{create_provider, Provider, ProviderError, ProviderModelConfig};

pub use tools::{ToolError, ToolRegistry};

pub use rpc::{Dispatcher, JsonRpcRequest, JsonRpcResponse, RpcError, ToolClient, DEFAULT_TOOL_TIMEOUT};

pub use speech::{OpenAiSpeech, OpenAiSpeechConfig, SpeechError, SpeechSynthesizer, Transcriber};

pub use chat::{ChatError, ChatResult, Delivery, Finalized, Orchestrator, SpeakOptions, SpeakReply, TextStream};
