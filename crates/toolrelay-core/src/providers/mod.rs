//! LLM provider implementations
//!
//! All real backends go through the `genai` crate, which handles streaming
//! SSE parsing, provider-specific protocols and tool calling. Auth comes from
//! the key passed in [`ProviderModelConfig`], never from genai's env lookup.
//!
//! The `MockProvider` plays back scripted turns for tests and offline runs.

mod traits;
mod error;
mod genai_adapter;
mod genai_provider;
mod mock;

pub use traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
pub use error::{ProviderError, ProviderResult};

pub use genai_provider::GenaiProvider;
pub use genai_adapter::is_genai_native;

pub use mock::{MockConfig, MockProvider, MockTurn, RecordedRequest};

use crate::logging::SharedLogger;
use std::sync::Arc;

/// Create a provider for the given provider ID
///
/// `mock` yields an echoing [`MockProvider`]; anything else is handed to
/// genai, which treats unknown IDs as OpenAI-compatible when an api_base is set.
pub fn create_provider(provider_id: &str, logger: SharedLogger) -> Arc<dyn Provider> {
    match provider_id.to_lowercase().as_str() {
        "mock" => Arc::new(MockProvider::echo(logger)),
        id => {
            if !is_genai_native(id) {
                logger.warn(&format!(
                    "[Providers] '{}' is not a native genai provider, relying on api_base",
                    id
                ));
            }
            Arc::new(GenaiProvider::new(id, logger))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;

    #[test]
    fn test_create_provider() {
        assert_eq!(create_provider("mock", NoOpLogger::shared()).name(), "mock");
        assert_eq!(create_provider("OpenAI", NoOpLogger::shared()).name(), "openai");
    }
}
