//! YAML configuration file
//!
//! Every field is optional; whatever is present overrides the defaults in
//! [`ServiceConfig`](super::ServiceConfig). The user-level file lives at
//! `~/.config/toolrelay/config.yaml`.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::ConfigResult;

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ConfigFile {
    pub bind_addr: Option<SocketAddr>,
    pub mcp_server_url: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub tts_model: Option<String>,
    pub default_voice: Option<String>,
    pub audio_format: Option<String>,
    pub transcription_model: Option<String>,
    pub transcription_language: Option<String>,
    pub tool_timeout_secs: Option<u64>,
    pub static_dir: Option<PathBuf>,
}

/// Reads a [`ConfigFile`] from disk
///
/// # Example
///
/// ```no_run
/// use toolrelay_core::config::FileConfigProvider;
///
/// let file = FileConfigProvider::user().load().unwrap();
/// println!("{:?}", file.model);
/// ```
#[derive(Debug, Clone)]
pub struct FileConfigProvider {
    path: PathBuf,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// User-level config provider (~/.config/toolrelay/config.yaml)
    pub fn user() -> Self {
        // XDG config directory on Linux, Application Support on macOS
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("toolrelay").join("config.yaml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the file; a missing file yields an empty overlay
    pub fn load(&self) -> ConfigResult<ConfigFile> {
        if !self.path.exists() {
            return Ok(ConfigFile::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ConfigFile::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }
}
