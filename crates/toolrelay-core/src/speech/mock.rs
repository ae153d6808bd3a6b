//! In-memory speech backend for tests and offline runs

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::{SpeechError, SpeechResult};
use super::traits::{SpeechSynthesizer, Transcriber};

/// Returns fixed audio and transcripts, recording every synthesis request
#[derive(Debug, Default)]
pub struct MockSpeech {
    audio: Vec<u8>,
    transcript: String,
    failure: Option<String>,
    synthesized: Mutex<Vec<(String, String)>>,
}

impl MockSpeech {
    /// Backend that answers synthesis with `audio`
    pub fn new(audio: impl Into<Vec<u8>>) -> Self {
        Self {
            audio: audio.into(),
            ..Default::default()
        }
    }

    /// Set the transcript returned for any non-empty upload
    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = transcript.into();
        self
    }

    /// Make every call fail with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Default::default()
        }
    }

    /// `(text, voice)` pairs passed to `synthesize`, oldest first
    pub fn synthesized(&self) -> Vec<(String, String)> {
        self.synthesized.lock().clone()
    }

    fn check(&self) -> SpeechResult<()> {
        match &self.failure {
            Some(message) => Err(SpeechError::Api {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSpeech {
    async fn synthesize(&self, text: &str, voice: &str) -> SpeechResult<Vec<u8>> {
        self.synthesized
            .lock()
            .push((text.to_string(), voice.to_string()));
        self.check()?;
        Ok(self.audio.clone())
    }
}

#[async_trait]
impl Transcriber for MockSpeech {
    async fn transcribe(&self, audio: Vec<u8>, _filename: &str, _mime: &str) -> SpeechResult<String> {
        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }
        self.check()?;
        Ok(self.transcript.clone())
    }
}
