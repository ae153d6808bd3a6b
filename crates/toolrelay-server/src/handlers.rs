//! Route handlers

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};
use toolrelay_core::{CancellationToken, ChatMessage, JsonRpcResponse, SpeakOptions, SpeakReply};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

/// Body of `POST /speak`
#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub voice: Option<String>,
    /// Audio is synthesized unless the client opts out
    #[serde(default = "default_audio")]
    pub audio: bool,
}

fn default_audio() -> bool {
    true
}

/// Body of `POST /speak/stream`
#[derive(Debug, Deserialize)]
pub struct StreamRequest {
    pub messages: Vec<ChatMessage>,
}

/// Body of `POST /log`
#[derive(Debug, Deserialize)]
pub struct LogRequest {
    pub message: String,
}

/// Multipart field carrying the upload for `/transcribe`
const AUDIO_FIELD: &str = "audio";

/// Complete mode: the whole answer, with audio when requested
pub async fn speak(
    State(state): State<AppState>,
    Json(request): Json<SpeakRequest>,
) -> Result<Json<SpeakReply>, ApiError> {
    debug!(
        messages = request.messages.len(),
        audio = request.audio,
        "speak request"
    );
    let options = SpeakOptions {
        voice: request.voice,
        audio: request.audio,
    };
    let reply = state.delivery.speak(request.messages, options).await?;
    Ok(Json(reply))
}

/// Streaming mode: the final answer as a chunked `text/plain` body
///
/// The body owns the stream; when the client disconnects the body is
/// dropped, which cancels the provider stream.
pub async fn speak_stream(
    State(state): State<AppState>,
    Json(request): Json<StreamRequest>,
) -> Result<Response, ApiError> {
    let stream = state
        .delivery
        .stream(request.messages, CancellationToken::new())
        .await?;

    let body = Body::from_stream(stream.map(Ok::<_, Infallible>));
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response())
}

/// JSON-RPC tool endpoint
pub async fn mcp(
    State(state): State<AppState>,
    Json(raw): Json<Value>,
) -> Result<Json<JsonRpcResponse>, ApiError> {
    Ok(Json(state.dispatcher.handle_value(raw)?))
}

/// Speech-to-text for a multipart `audio` upload
pub async fn transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let transcriber = state
        .transcriber
        .clone()
        .ok_or(ApiError::Unavailable("Transcription"))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("audio.webm").to_string();
        let mime = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let audio = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        if audio.is_empty() {
            return Err(ApiError::BadRequest("Uploaded audio is empty".to_string()));
        }

        debug!(bytes = audio.len(), %filename, "transcribing upload");
        let text = transcriber.transcribe(audio.to_vec(), &filename, &mime).await?;
        return Ok(Json(json!({ "text": text })));
    }

    Err(ApiError::BadRequest(format!("Missing '{}' field", AUDIO_FIELD)))
}

/// Client-side log ingestion
pub async fn log(Json(request): Json<LogRequest>) -> Json<Value> {
    info!(target: "toolrelay::client", "{}", request.message);
    Json(json!({ "status": "ok" }))
}
