//! Provider error types

use thiserror::Error;

/// Errors that can occur during provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    /// API request failed
    #[error("{provider} API error ({status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    /// JSON conversion error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Request was cancelled
    #[error("Request cancelled")]
    Cancelled,

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Create an API error
    pub fn api_error(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
