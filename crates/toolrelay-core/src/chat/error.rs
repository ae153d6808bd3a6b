//! Chat error types

use thiserror::Error;

use crate::providers::ProviderError;
use crate::speech::SpeechError;

/// Errors surfaced to the caller of a completion
///
/// Tool failures never appear here; they are folded into the conversation
/// as fallback text.
#[derive(Error, Debug)]
pub enum ChatError {
    /// The request carried no messages
    #[error("Conversation is empty")]
    EmptyConversation,

    /// The LLM provider failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Speech synthesis failed
    #[error("Speech error: {0}")]
    Speech(#[from] SpeechError),
}

impl ChatError {
    /// Whether the caller, rather than an upstream service, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, ChatError::EmptyConversation)
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
