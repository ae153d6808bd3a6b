//! In-memory secret store

use std::collections::HashMap;

use parking_lot::RwLock;

use super::traits::{SecretStore, SecretStoreResult};

/// Read-write store held in memory, for tests and embedding
///
/// # Example
///
/// ```
/// use toolrelay_core::secrets::{SecretStore, MemorySecretStore};
///
/// let store = MemorySecretStore::new();
/// store.store("openai", "sk-test").unwrap();
/// assert_eq!(store.get("openai"), Some("sk-test".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secrets(initial: HashMap<String, String>) -> Self {
        Self {
            secrets: RwLock::new(initial),
        }
    }

    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.secrets.read().get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        self.secrets.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemorySecretStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("openai"), None);

        store.store("openai", "sk-1").unwrap();
        store.store("openai", "sk-2").unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("openai"), Some("sk-2".to_string()));
        assert!(store.has("openai"));
    }

    #[test]
    fn test_memory_store_with_initial() {
        let initial = HashMap::from([("anthropic".to_string(), "a-key".to_string())]);
        let store = MemorySecretStore::with_secrets(initial);

        assert_eq!(store.name(), "memory");
        assert_eq!(store.get("anthropic").as_deref(), Some("a-key"));
    }
}
