//! Delivery of the final answer: complete replies and text streams

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::logging::SharedLogger;
use crate::providers::StreamResponse;
use crate::speech::SpeechSynthesizer;
use crate::types::{CancellationToken, ChatMessage, DropGuard};

use super::error::ChatResult;
use super::orchestrator::Orchestrator;

/// Per-request options for complete mode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeakOptions {
    /// Voice override; the configured default is used when absent
    #[serde(default)]
    pub voice: Option<String>,
    /// Whether to synthesize audio for the reply
    #[serde(default)]
    pub audio: bool,
}

/// Complete-mode reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakReply {
    pub text: String,
    /// Base64-encoded audio, present when audio was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

/// Lazy, finite stream of text fragments
///
/// Dropping it cancels the request: the pump task stops and the provider
/// stream is released.
pub struct TextStream {
    inner: ReceiverStream<String>,
    _guard: DropGuard,
}

impl Stream for TextStream {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        self.inner.poll_next_unpin(cx)
    }
}

/// Fragment emitted when the provider fails mid-stream
pub fn stream_error_fragment(reason: impl std::fmt::Display) -> String {
    format!("[streaming error: {}]", reason)
}

/// Turns orchestrator output into replies for the transport layer
pub struct Delivery {
    orchestrator: Arc<Orchestrator>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    default_voice: String,
    logger: SharedLogger,
}

impl Delivery {
    pub fn new(orchestrator: Arc<Orchestrator>, default_voice: impl Into<String>, logger: SharedLogger) -> Self {
        Self {
            orchestrator,
            synthesizer: None,
            default_voice: default_voice.into(),
            logger,
        }
    }

    /// Enable audio replies
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// The orchestrator behind this delivery layer
    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    /// Complete mode: final text, plus audio when requested
    pub async fn speak(&self, messages: Vec<ChatMessage>, options: SpeakOptions) -> ChatResult<SpeakReply> {
        let finalized = self.orchestrator.complete(messages).await?;

        if !options.audio {
            return Ok(SpeakReply {
                text: finalized.text,
                audio: None,
            });
        }

        if finalized.text.trim().is_empty() {
            self.logger.debug("[Delivery] Empty answer, skipping synthesis");
            return Ok(SpeakReply {
                text: String::new(),
                audio: Some(String::new()),
            });
        }

        let Some(synthesizer) = &self.synthesizer else {
            self.logger
                .warn("[Delivery] Audio requested but no synthesizer is configured");
            return Ok(SpeakReply {
                text: finalized.text,
                audio: None,
            });
        };

        let voice = options.voice.as_deref().unwrap_or(&self.default_voice);
        let bytes = synthesizer.synthesize(&finalized.text, voice).await?;
        self.logger.debug(&format!("[Delivery] Synthesized {} bytes", bytes.len()));

        Ok(SpeakReply {
            audio: Some(BASE64.encode(bytes)),
            text: finalized.text,
        })
    }

    /// Streaming mode: run round 1, then stream the final round
    ///
    /// Errors before the first fragment (empty conversation, provider
    /// failure on round 1 or when opening the stream) are returned directly.
    pub async fn stream(&self, messages: Vec<ChatMessage>, cancel: CancellationToken) -> ChatResult<TextStream> {
        let prepared = self.orchestrator.prepare_stream(messages).await?;

        let provider_stream = self
            .orchestrator
            .provider()
            .stream_chat(
                prepared.conversation,
                self.orchestrator.model().clone(),
                Orchestrator::final_round_options(),
                cancel.clone(),
            )
            .await?;

        let (tx, rx) = mpsc::channel(1);
        let guard = cancel.drop_guard();
        tokio::spawn(pump(provider_stream, tx, cancel, self.logger.clone()));

        Ok(TextStream {
            inner: ReceiverStream::new(rx),
            _guard: guard,
        })
    }
}

/// Forward text fragments until the provider finishes, fails or the
/// consumer goes away
async fn pump(
    mut stream: StreamResponse,
    tx: mpsc::Sender<String>,
    cancel: CancellationToken,
    logger: SharedLogger,
) {
    let mut fragments = 0usize;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                logger.debug("[Delivery] Stream cancelled by consumer");
                break;
            }
            next = stream.next() => match next {
                Some(Ok(chunk)) => {
                    let Some(text) = chunk.as_text().filter(|t| !t.is_empty()) else {
                        continue;
                    };
                    if tx.send(text.to_string()).await.is_err() {
                        break;
                    }
                    fragments += 1;
                }
                Some(Err(e)) => {
                    logger.error(&format!("[Delivery] Stream failed after {} fragments: {}", fragments, e));
                    let _ = tx.send(stream_error_fragment(&e)).await;
                    break;
                }
                None => {
                    logger.debug(&format!("[Delivery] Stream finished, {} fragments", fragments));
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatError;
    use crate::logging::NoOpLogger;
    use crate::providers::{MockProvider, MockTurn, ProviderModelConfig};
    use crate::rpc::{ToolClient, DEFAULT_TOOL_TIMEOUT};
    use crate::speech::MockSpeech;
    use crate::testing::{closed_url, serve, tool_router};
    use crate::tools::ToolRegistry;
    use crate::types::ToolCall;
    use serde_json::json;
    use std::time::Duration;

    fn delivery(provider: Arc<MockProvider>, tool_url: String) -> Delivery {
        let registry = ToolRegistry::with_builtin_tools().unwrap();
        let client = ToolClient::new(tool_url, DEFAULT_TOOL_TIMEOUT, NoOpLogger::shared()).unwrap();
        let orchestrator = Orchestrator::new(
            provider,
            ProviderModelConfig::new("gpt-4o"),
            &registry,
            client,
            NoOpLogger::shared(),
        );
        Delivery::new(Arc::new(orchestrator), "nova", NoOpLogger::shared())
    }

    async fn collect(stream: TextStream) -> Vec<String> {
        stream.collect().await
    }

    #[tokio::test]
    async fn test_speak_with_audio() {
        let provider = Arc::new(MockProvider::scripted(
            vec![MockTurn::text("Hello!")],
            NoOpLogger::shared(),
        ));
        let speech = Arc::new(MockSpeech::new(b"mp3".to_vec()));
        let d = delivery(provider, closed_url().await).with_synthesizer(speech.clone());

        let reply = d
            .speak(
                vec![ChatMessage::user("hi")],
                SpeakOptions { voice: Some("alloy".to_string()), audio: true },
            )
            .await
            .unwrap();

        assert_eq!(reply.text, "Hello!");
        assert_eq!(reply.audio.as_deref(), Some("bXAz"));
        assert_eq!(speech.synthesized(), vec![("Hello!".to_string(), "alloy".to_string())]);
    }

    #[tokio::test]
    async fn test_speak_default_voice() {
        let provider = Arc::new(MockProvider::scripted(vec![MockTurn::text("Hi")], NoOpLogger::shared()));
        let speech = Arc::new(MockSpeech::new(b"x".to_vec()));
        let d = delivery(provider, closed_url().await).with_synthesizer(speech.clone());

        d.speak(vec![ChatMessage::user("hi")], SpeakOptions { voice: None, audio: true })
            .await
            .unwrap();

        assert_eq!(speech.synthesized()[0].1, "nova");
    }

    #[tokio::test]
    async fn test_speak_blank_text_skips_synthesis() {
        let provider = Arc::new(MockProvider::scripted(vec![MockTurn::text("  \n")], NoOpLogger::shared()));
        let speech = Arc::new(MockSpeech::new(b"x".to_vec()));
        let d = delivery(provider, closed_url().await).with_synthesizer(speech.clone());

        let reply = d
            .speak(vec![ChatMessage::user("hi")], SpeakOptions { voice: None, audio: true })
            .await
            .unwrap();

        assert_eq!(reply, SpeakReply { text: String::new(), audio: Some(String::new()) });
        assert!(speech.synthesized().is_empty());
    }

    #[tokio::test]
    async fn test_speak_without_audio() {
        let provider = Arc::new(MockProvider::scripted(vec![MockTurn::text("Hi")], NoOpLogger::shared()));
        let speech = Arc::new(MockSpeech::new(b"x".to_vec()));
        let d = delivery(provider, closed_url().await).with_synthesizer(speech.clone());

        let reply = d
            .speak(vec![ChatMessage::user("hi")], SpeakOptions::default())
            .await
            .unwrap();

        assert_eq!(reply.audio, None);
        assert!(speech.synthesized().is_empty());
    }

    #[tokio::test]
    async fn test_speak_blank_text_without_audio_is_verbatim() {
        let provider = Arc::new(MockProvider::scripted(vec![MockTurn::text("  \n")], NoOpLogger::shared()));
        let speech = Arc::new(MockSpeech::new(b"x".to_vec()));
        let d = delivery(provider, closed_url().await).with_synthesizer(speech.clone());

        let reply = d
            .speak(vec![ChatMessage::user("hi")], SpeakOptions::default())
            .await
            .unwrap();

        assert_eq!(reply, SpeakReply { text: "  \n".to_string(), audio: None });
        assert!(speech.synthesized().is_empty());
    }

    #[tokio::test]
    async fn test_speak_synthesis_failure() {
        let provider = Arc::new(MockProvider::scripted(vec![MockTurn::text("Hi")], NoOpLogger::shared()));
        let d = delivery(provider, closed_url().await)
            .with_synthesizer(Arc::new(MockSpeech::failing("tts down")));

        let err = d
            .speak(vec![ChatMessage::user("hi")], SpeakOptions { voice: None, audio: true })
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Speech(_)));
    }

    #[tokio::test]
    async fn test_stream_concatenation_matches_complete() {
        let answer = "It is 9 o'clock in the morning in Seoul.";
        let call = ToolCall::new("call_1", "get_current_time", json!({}));
        let base = serve(tool_router()).await;

        let complete_provider = Arc::new(MockProvider::scripted(
            vec![MockTurn::tool_call(call.clone()), MockTurn::text(answer)],
            NoOpLogger::shared(),
        ));
        let complete = delivery(complete_provider, format!("{}/mcp", base))
            .speak(vec![ChatMessage::user("What time is it?")], SpeakOptions::default())
            .await
            .unwrap();

        let stream_provider = Arc::new(
            MockProvider::scripted(
                vec![MockTurn::tool_call(call), MockTurn::text(answer)],
                NoOpLogger::shared(),
            )
            .with_chunk_size(4),
        );
        let d = delivery(stream_provider.clone(), format!("{}/mcp", base));
        let fragments = collect(
            d.stream(vec![ChatMessage::user("What time is it?")], CancellationToken::new())
                .await
                .unwrap(),
        )
        .await;

        assert!(fragments.len() > 1);
        assert_eq!(fragments.concat(), complete.text);
        assert!(stream_provider.requests()[1].tool_names.is_empty());
    }

    #[tokio::test]
    async fn test_stream_direct_answer_reissues_without_tools() {
        let provider = Arc::new(MockProvider::scripted(
            vec![MockTurn::text("Hello there"), MockTurn::text("Hello there")],
            NoOpLogger::shared(),
        ));
        let d = delivery(provider.clone(), closed_url().await);
        let messages = vec![ChatMessage::user("hi")];

        let fragments = collect(d.stream(messages.clone(), CancellationToken::new()).await.unwrap()).await;

        assert_eq!(fragments.concat(), "Hello there");
        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].messages, messages);
        assert!(requests[1].tool_names.is_empty());
    }

    #[tokio::test]
    async fn test_stream_mid_stream_error_fragment() {
        let provider = Arc::new(MockProvider::scripted(
            vec![
                MockTurn::text("ignored"),
                MockTurn::FailAfter {
                    chunks: vec!["Partial ".to_string()],
                    message: "connection reset".to_string(),
                },
            ],
            NoOpLogger::shared(),
        ));
        let d = delivery(provider, closed_url().await);

        let fragments = collect(d.stream(vec![ChatMessage::user("hi")], CancellationToken::new()).await.unwrap()).await;

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0], "Partial ");
        assert!(fragments[1].starts_with("[streaming error: "));
        assert!(fragments[1].contains("connection reset"));
    }

    #[tokio::test]
    async fn test_stream_empty_conversation() {
        let provider = Arc::new(MockProvider::echo(NoOpLogger::shared()));
        let d = delivery(provider.clone(), closed_url().await);

        let result = d.stream(Vec::new(), CancellationToken::new()).await;
        assert!(matches!(result, Err(ChatError::EmptyConversation)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_stream_start_failure_is_provider_error() {
        let provider = Arc::new(MockProvider::scripted(
            vec![MockTurn::text("x"), MockTurn::error("down")],
            NoOpLogger::shared(),
        ));
        let d = delivery(provider.clone(), closed_url().await);

        let result = d.stream(vec![ChatMessage::user("hi")], CancellationToken::new()).await;
        assert!(matches!(result, Err(ChatError::Provider(_))));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_dropping_stream_cancels() {
        let provider = Arc::new(
            MockProvider::scripted(
                vec![
                    MockTurn::text("x"),
                    MockTurn::text("a long answer that trickles out slowly"),
                ],
                NoOpLogger::shared(),
            )
            .with_chunk_size(2)
            .with_delay(20),
        );
        let d = delivery(provider, closed_url().await);
        let cancel = CancellationToken::new();

        let mut stream = d.stream(vec![ChatMessage::user("hi")], cancel.clone()).await.unwrap();
        assert!(stream.next().await.is_some());
        drop(stream);

        assert!(cancel.is_cancelled());
        tokio::time::timeout(Duration::from_secs(1), cancel.cancelled())
            .await
            .unwrap();
    }
}
