//! Resolved service settings
//!
//! Loading order: defaults, then the YAML file, then environment variables.
//! The provider API key comes from a [`SecretStore`].

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::secrets::{EnvSecretStore, SecretStore};

use super::error::{ConfigError, ConfigResult};
use super::file::{ConfigFile, FileConfigProvider};

/// Environment variable naming the YAML config file
pub const CONFIG_PATH_VAR: &str = "TOOLRELAY_CONFIG";
pub const MCP_SERVER_URL_VAR: &str = "MCP_SERVER_URL";
pub const PORT_VAR: &str = "PORT";
pub const MODEL_VAR: &str = "TOOLRELAY_MODEL";

/// Settings for the toolrelay service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    /// Remote JSON-RPC tool endpoint
    pub mcp_server_url: Option<String>,
    pub provider: String,
    pub model: String,
    pub api_base: Option<String>,
    pub tts_model: String,
    pub default_voice: String,
    pub audio_format: String,
    pub transcription_model: String,
    pub transcription_language: Option<String>,
    pub tool_timeout_secs: u64,
    pub static_dir: PathBuf,
    /// Resolved from the secret store, never from the file
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            mcp_server_url: None,
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            api_base: None,
            tts_model: "gpt-4o-mini-tts".to_string(),
            default_voice: "nova".to_string(),
            audio_format: "mp3".to_string(),
            transcription_model: "whisper-1".to_string(),
            transcription_language: Some("ko".to_string()),
            tool_timeout_secs: 5,
            static_dir: PathBuf::from("public"),
            api_key: None,
        }
    }
}

impl ServiceConfig {
    /// Load from the process environment and the given (or discovered) file
    pub fn load(path: Option<&Path>, secrets: &dyn SecretStore) -> ConfigResult<Self> {
        Self::load_with(path, |key| std::env::var(key).ok(), secrets)
    }

    /// Load with an explicit variable lookup
    pub fn load_with<F>(path: Option<&Path>, lookup: F, secrets: &dyn SecretStore) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| lookup(CONFIG_PATH_VAR).filter(|p| !p.is_empty()).map(PathBuf::from));
        match explicit {
            Some(path) => {
                let provider = FileConfigProvider::new(&path);
                if !provider.exists() {
                    return Err(ConfigError::NotFound(path));
                }
                config.apply_file(provider.load()?);
            }
            None => {
                let provider = FileConfigProvider::user();
                if provider.exists() {
                    config.apply_file(provider.load()?);
                }
            }
        }

        config.apply_env(&lookup)?;
        config.api_key = secrets.get(&config.provider);
        config.validate()?;
        Ok(config)
    }

    /// Overlay the fields present in `file`
    pub fn apply_file(&mut self, file: ConfigFile) {
        if let Some(v) = file.bind_addr {
            self.bind_addr = v;
        }
        if let Some(v) = file.mcp_server_url {
            self.mcp_server_url = Some(v);
        }
        if let Some(v) = file.provider {
            self.provider = v;
        }
        if let Some(v) = file.model {
            self.model = v;
        }
        if let Some(v) = file.api_base {
            self.api_base = Some(v);
        }
        if let Some(v) = file.tts_model {
            self.tts_model = v;
        }
        if let Some(v) = file.default_voice {
            self.default_voice = v;
        }
        if let Some(v) = file.audio_format {
            self.audio_format = v;
        }
        if let Some(v) = file.transcription_model {
            self.transcription_model = v;
        }
        if let Some(v) = file.transcription_language {
            // An empty language lets the transcription model detect it
            self.transcription_language = Some(v).filter(|l| !l.is_empty());
        }
        if let Some(v) = file.tool_timeout_secs {
            self.tool_timeout_secs = v;
        }
        if let Some(v) = file.static_dir {
            self.static_dir = v;
        }
    }

    /// Overlay `MCP_SERVER_URL`, `PORT` and `TOOLRELAY_MODEL`
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(MCP_SERVER_URL_VAR) {
            self.mcp_server_url = Some(url);
        }
        if let Some(port) = lookup(PORT_VAR) {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(PORT_VAR, format!("{}: {:?}", e, port)))?;
            self.bind_addr.set_port(port);
        }
        if let Some(model) = lookup(MODEL_VAR) {
            self.model = model;
        }
        Ok(())
    }

    /// Check required settings, naming every one that is missing
    pub fn validate(&self) -> ConfigResult<()> {
        let mut missing = Vec::new();

        if self.mcp_server_url.as_deref().map_or(true, str::is_empty) {
            missing.push(MCP_SERVER_URL_VAR.to_string());
        }
        if self.api_key.is_none() {
            if let Some(var) = self.api_key_var() {
                missing.push(var);
            }
        }

        if self.tool_timeout_secs == 0 {
            return Err(ConfigError::invalid("tool_timeout_secs", "must be at least 1"));
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingRequired(missing))
        }
    }

    /// Environment variable holding the provider key, if one is needed
    pub fn api_key_var(&self) -> Option<String> {
        match EnvSecretStore::get_env_vars_for_provider(&self.provider) {
            Some(vars) => vars.first().map(|v| v.to_string()),
            None => Some(format!("{}_API_KEY", self.provider.to_uppercase())),
        }
    }

    /// Deadline for one tool call
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}
