//! Environment variable secret store

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;

use super::traits::SecretStore;

/// Mapping from provider names to environment variable names
static ENV_VAR_MAP: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    m.insert("openai", &["OPENAI_API_KEY"]);
    m.insert("anthropic", &["ANTHROPIC_API_KEY"]);
    m
});

/// Secret store that reads from environment variables
///
/// Lookup order for a key:
/// 1. the key itself as a variable name (`OPENAI_API_KEY`)
/// 2. the provider mapping (`openai` → `OPENAI_API_KEY`, `anthropic` → `ANTHROPIC_API_KEY`)
/// 3. `<KEY>_API_KEY`
///
/// Empty values count as unset.
#[derive(Debug, Default)]
pub struct EnvSecretStore {
    _private: (),
}

impl EnvSecretStore {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Environment variable names checked for a provider
    pub fn env_vars_for_provider(provider: &str) -> Option<&'static [&'static str]> {
        ENV_VAR_MAP.get(provider.to_lowercase().as_str()).copied()
    }
}

fn read_non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = read_non_empty(key) {
            return Some(value);
        }

        if let Some(vars) = Self::env_vars_for_provider(key) {
            if let Some(value) = vars.iter().find_map(|var| read_non_empty(var)) {
                return Some(value);
            }
        }

        read_non_empty(&format!("{}_API_KEY", key.to_uppercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_store_name() {
        assert_eq!(EnvSecretStore::new().name(), "env");
    }

    #[test]
    fn test_env_store_get_direct() {
        env::set_var("HELPS_PROXY_TEST_SECRET_1", "test_value");

        let store = EnvSecretStore::new();
        assert_eq!(store.get("HELPS_PROXY_TEST_SECRET_1"), Some("test_value".to_string()));

        env::remove_var("HELPS_PROXY_TEST_SECRET_1");
    }

    #[test]
    fn test_env_store_suffix_fallback() {
        env::set_var("HELPSPROXYTESTVENDOR_API_KEY", "k-123");

        let store = EnvSecretStore::new();
        assert_eq!(store.get("helpsproxytestvendor"), Some("k-123".to_string()));

        env::remove_var("HELPSPROXYTESTVENDOR_API_KEY");
    }

    #[test]
    fn test_env_store_empty_value_is_unset() {
        env::set_var("HELPS_PROXY_TEST_EMPTY", "");
        assert!(!EnvSecretStore::new().has("HELPS_PROXY_TEST_EMPTY"));
        env::remove_var("HELPS_PROXY_TEST_EMPTY");
    }

    #[test]
    fn test_provider_mapping() {
        assert_eq!(EnvSecretStore::env_vars_for_provider("OpenAI"), Some(&["OPENAI_API_KEY"][..]));
        assert_eq!(EnvSecretStore::env_vars_for_provider("anthropic"), Some(&["ANTHROPIC_API_KEY"][..]));
        assert!(EnvSecretStore::env_vars_for_provider("nonexistent_provider_xyz").is_none());
    }
}
