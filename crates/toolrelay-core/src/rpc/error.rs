//! RPC error types

use thiserror::Error;

/// Errors that can occur during RPC operations
#[derive(Error, Debug)]
pub enum RpcError {
    /// Request body is not a well-formed JSON-RPC request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Tool-call arguments were not a JSON object
    #[error("Invalid arguments: expected an object, got {0}")]
    InvalidArguments(&'static str),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Timeout after {0} ms")]
    Timeout(u128),

    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The remote endpoint answered with a JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    Remote { code: i64, message: String },
}

pub type RpcResult<T> = Result<T, RpcError>;
