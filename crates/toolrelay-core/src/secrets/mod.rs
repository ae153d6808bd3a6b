//! Secret storage for provider API keys
//!
//! - `SecretStore` trait for custom stores
//! - `EnvSecretStore`: process environment (with provider-name mapping)
//! - `MemorySecretStore`: in-memory, for tests

mod env_store;
mod memory_store;
mod traits;

pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;
pub use traits::{SecretStore, SecretStoreError, SecretStoreResult};
