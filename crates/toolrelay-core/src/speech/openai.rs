//! OpenAI audio endpoints (`/audio/speech`, `/audio/transcriptions`)

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};

use crate::logging::SharedLogger;

use super::error::{SpeechError, SpeechResult};
use super::traits::{SpeechSynthesizer, Transcriber};

/// Default OpenAI API base
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Settings for the OpenAI audio client
#[derive(Debug, Clone)]
pub struct OpenAiSpeechConfig {
    pub api_key: String,
    pub api_base: String,
    pub tts_model: String,
    pub audio_format: String,
    pub transcription_model: String,
    /// ISO-639-1 hint passed to transcription; `None` lets the model detect
    pub language: Option<String>,
}

impl OpenAiSpeechConfig {
    /// Defaults for the given key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: OPENAI_API_BASE.to_string(),
            tts_model: "gpt-4o-mini-tts".to_string(),
            audio_format: "mp3".to_string(),
            transcription_model: "whisper-1".to_string(),
            language: None,
        }
    }
}

/// Speech client for OpenAI-compatible audio APIs
pub struct OpenAiSpeech {
    http: reqwest::Client,
    config: OpenAiSpeechConfig,
    logger: SharedLogger,
}

impl OpenAiSpeech {
    pub fn new(config: OpenAiSpeechConfig, logger: SharedLogger) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            logger,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    async fn check_status(response: reqwest::Response) -> SpeechResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(SpeechError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    async fn synthesize(&self, text: &str, voice: &str) -> SpeechResult<Vec<u8>> {
        self.logger.debug(&format!(
            "[Speech] Synthesizing {} chars with voice {}",
            text.len(),
            voice
        ));

        let body = json!({
            "model": self.config.tts_model,
            "input": text,
            "voice": voice,
            "response_format": self.config.audio_format,
        });

        let response = self
            .http
            .post(self.url("/audio/speech"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let bytes = Self::check_status(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Transcriber for OpenAiSpeech {
    async fn transcribe(&self, audio: Vec<u8>, filename: &str, mime: &str) -> SpeechResult<String> {
        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }

        self.logger.debug(&format!(
            "[Speech] Transcribing {} bytes ({})",
            audio.len(),
            filename
        ));

        let part = Part::bytes(audio)
            .file_name(filename.to_string())
            .mime_str(mime)?;
        let mut form = Form::new()
            .part("file", part)
            .text("model", self.config.transcription_model.clone())
            .text("response_format", "json");
        if let Some(lang) = &self.config.language {
            form = form.text("language", lang.clone());
        }

        let response = self
            .http
            .post(self.url("/audio/transcriptions"))
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        let json: Value = Self::check_status(response).await?.json().await?;
        json.get("text")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| SpeechError::InvalidResponse("Missing 'text' field".to_string()))
    }
}
