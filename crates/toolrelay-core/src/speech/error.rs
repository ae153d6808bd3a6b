//! Speech error types

use thiserror::Error;

/// Errors from speech synthesis or transcription
#[derive(Error, Debug)]
pub enum SpeechError {
    /// No audio was supplied
    #[error("Empty audio upload")]
    EmptyAudio,

    /// Network/HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The speech API answered with a failure status
    #[error("Speech API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response could not be interpreted
    #[error("Invalid speech response: {0}")]
    InvalidResponse(String),
}

pub type SpeechResult<T> = Result<T, SpeechError>;
