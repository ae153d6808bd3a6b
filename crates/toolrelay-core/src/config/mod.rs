//! Service configuration
//!
//! - `ServiceConfig`: resolved settings (defaults, YAML file, environment)
//! - `FileConfigProvider`: YAML file at an explicit path or user level
//! - `load_env_file`: `.env` loading without overriding the environment

mod env;
mod error;
mod file;
mod service;

pub use env::{load_env_file, parse_env, EnvFileReport};
pub use error::{ConfigError, ConfigResult};
pub use file::{ConfigFile, FileConfigProvider};
pub use service::{ServiceConfig, CONFIG_PATH_VAR, MCP_SERVER_URL_VAR, MODEL_VAR, PORT_VAR};
