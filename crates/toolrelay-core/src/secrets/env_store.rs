//! Environment variable secret store

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Provider names mapped to the variables that may hold their key.
/// An empty list means the provider needs no key.
static ENV_VAR_MAP: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("openai", vec!["OPENAI_API_KEY"]);
    m.insert("anthropic", vec!["ANTHROPIC_API_KEY"]);
    m.insert("gemini", vec!["GEMINI_API_KEY", "GOOGLE_API_KEY"]);
    m.insert("groq", vec!["GROQ_API_KEY"]);
    m.insert("xai", vec!["XAI_API_KEY"]);
    m.insert("deepseek", vec!["DEEPSEEK_API_KEY"]);
    m.insert("ollama", vec![]);
    m.insert("mock", vec![]);
    m
});

/// Read-only store over the process environment
///
/// `.env` files are loaded into the environment before this store is
/// consulted (see [`crate::config::load_env_file`]).
///
/// Lookup order for `get(key)`:
/// 1. `key` as a variable name
/// 2. the variables mapped to `key` as a provider name (`openai` → `OPENAI_API_KEY`)
/// 3. `{KEY}_API_KEY`
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn new() -> Self {
        Self
    }

    /// Variables that hold the key for `provider`, if it is known
    pub fn get_env_vars_for_provider(provider: &str) -> Option<&'static [&'static str]> {
        ENV_VAR_MAP
            .get(provider.to_lowercase().as_str())
            .map(|v| v.as_slice())
    }

    fn read(name: &str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.is_empty())
    }
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = Self::read(key) {
            return Some(value);
        }

        if let Some(vars) = Self::get_env_vars_for_provider(key) {
            return vars.iter().find_map(|var| Self::read(var));
        }

        Self::read(&format!("{}_API_KEY", key.to_uppercase()))
    }

    fn store(&self, _key: &str, _value: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }
}
