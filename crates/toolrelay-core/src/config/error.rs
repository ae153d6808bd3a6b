//! Configuration errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Every required setting that could not be resolved, by variable name
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
