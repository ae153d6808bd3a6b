//! Secret store trait

use thiserror::Error;

/// Errors that can occur during secret store operations
#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("Store is read-only")]
    ReadOnly,

    #[error("Store error: {0}")]
    Other(String),
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// Source of provider API keys
///
/// Keys may be a provider name (`"openai"`), which the store maps to its
/// own naming, or a direct name (`"OPENAI_API_KEY"`).
///
/// # Example
///
/// ```
/// use toolrelay_core::secrets::{SecretStore, EnvSecretStore};
///
/// let store = EnvSecretStore::new();
/// // store.get("openai") checks OPENAI_API_KEY
/// ```
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Retrieve a secret by key
    fn get(&self, key: &str) -> Option<String>;

    /// Store a secret
    ///
    /// Returns `Err(SecretStoreError::ReadOnly)` if the store doesn't support writing.
    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()>;

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
