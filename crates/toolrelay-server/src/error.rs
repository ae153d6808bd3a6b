//! HTTP error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use toolrelay_core::{ChatError, RpcError, SpeechError};

/// Errors returned by route handlers, rendered as `{"error": "..."}`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Chat(#[from] ChatError),

    #[error("{0}")]
    Speech(#[from] SpeechError),

    #[error("{0}")]
    Rpc(#[from] RpcError),

    /// A capability that was not configured
    #[error("{0} is not available")]
    Unavailable(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Chat(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Chat(_) => StatusCode::BAD_GATEWAY,
            ApiError::Speech(SpeechError::EmptyAudio) => StatusCode::BAD_REQUEST,
            ApiError::Speech(_) => StatusCode::BAD_GATEWAY,
            ApiError::Rpc(RpcError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            ApiError::Rpc(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, "{}", self);
        } else {
            tracing::debug!(%status, "{}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
