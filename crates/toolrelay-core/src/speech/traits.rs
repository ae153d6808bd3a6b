//! Speech capability traits

use async_trait::async_trait;

use super::error::SpeechResult;

/// Text-to-speech
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Render `text` in `voice`, returning encoded audio bytes
    async fn synthesize(&self, text: &str, voice: &str) -> SpeechResult<Vec<u8>>;
}

/// Speech-to-text
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an uploaded audio file
    async fn transcribe(&self, audio: Vec<u8>, filename: &str, mime: &str) -> SpeechResult<String>;
}
