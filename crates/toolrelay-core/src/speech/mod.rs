//! Speech synthesis and transcription
//!
//! Complete-mode replies can carry synthesized audio; the server also offers
//! a transcription endpoint. Both go through the traits here so the
//! orchestrator and the HTTP layer can be tested without a network.

mod error;
mod mock;
mod openai;
mod traits;

pub use error::{SpeechError, SpeechResult};
pub use mock::MockSpeech;
pub use openai::{OpenAiSpeech, OpenAiSpeechConfig, OPENAI_API_BASE};
pub use traits::{SpeechSynthesizer, Transcriber};
