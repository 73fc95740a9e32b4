//! Secret store trait

/// Read-only lookup of provider API keys
///
/// Implementations:
/// - `EnvSecretStore`: environment variables
/// - `MemorySecretStore`: in-memory, for tests and embedding hosts
///
/// # Example
///
/// ```
/// use helps_proxy_core::secrets::{SecretStore, EnvSecretStore};
///
/// let store = EnvSecretStore::new();
/// // store.get("openai") checks OPENAI_API_KEY
/// ```
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Retrieve a secret by provider name (e.g. "openai") or direct key
    fn get(&self, key: &str) -> Option<String>;

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
