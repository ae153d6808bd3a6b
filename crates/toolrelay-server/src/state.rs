//! Shared application state

use std::path::PathBuf;
use std::sync::Arc;

use toolrelay_core::config::ServiceConfig;
use toolrelay_core::providers::create_provider;
use toolrelay_core::speech::{OpenAiSpeech, OpenAiSpeechConfig, Transcriber};
use toolrelay_core::{
    Delivery, Dispatcher, Orchestrator, ProviderModelConfig, SharedLogger, ToolClient,
    ToolRegistry,
};
use tracing::{info, warn};

/// Everything the route handlers need, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub delivery: Arc<Delivery>,
    pub dispatcher: Arc<Dispatcher>,
    pub transcriber: Option<Arc<dyn Transcriber>>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(delivery: Arc<Delivery>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            delivery,
            dispatcher,
            transcriber: None,
            static_dir: PathBuf::from("public"),
        }
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }

    /// Wire provider, tool client, registry and speech from resolved settings
    pub fn from_config(config: &ServiceConfig, logger: SharedLogger) -> anyhow::Result<Self> {
        let registry = Arc::new(ToolRegistry::with_builtin_tools()?);
        info!("Registered {} tools", registry.len());

        let mcp_server_url = config
            .mcp_server_url
            .clone()
            .ok_or_else(|| anyhow::anyhow!("mcp_server_url is not set"))?;
        let tool_client = ToolClient::new(mcp_server_url, config.tool_timeout(), logger.clone())?;

        let mut model = ProviderModelConfig::new(&config.model);
        if let Some(key) = &config.api_key {
            model = model.with_api_key(key);
        }
        if let Some(base) = &config.api_base {
            model = model.with_api_base(base);
        }

        let provider = create_provider(&config.provider, logger.clone());
        info!("LLM provider: {} ({})", provider.name(), config.model);

        let orchestrator = Arc::new(Orchestrator::new(
            provider,
            model,
            &registry,
            tool_client,
            logger.clone(),
        ));
        let mut delivery = Delivery::new(orchestrator, &config.default_voice, logger.clone());

        let speech = config.api_key.as_ref().map(|key| {
            let mut speech_config = OpenAiSpeechConfig::new(key);
            if let Some(base) = &config.api_base {
                speech_config.api_base = base.clone();
            }
            speech_config.tts_model = config.tts_model.clone();
            speech_config.audio_format = config.audio_format.clone();
            speech_config.transcription_model = config.transcription_model.clone();
            speech_config.language = config.transcription_language.clone();
            Arc::new(OpenAiSpeech::new(speech_config, logger.clone()))
        });

        let mut state = match speech {
            Some(speech) => {
                delivery = delivery.with_synthesizer(speech.clone());
                Self::new(Arc::new(delivery), Arc::new(Dispatcher::new(registry, logger)))
                    .with_transcriber(speech)
            }
            None => {
                warn!("No API key configured; speech synthesis and transcription are disabled");
                Self::new(Arc::new(delivery), Arc::new(Dispatcher::new(registry, logger)))
            }
        };
        state.static_dir = config.static_dir.clone();

        Ok(state)
    }
}
