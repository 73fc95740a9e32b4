//! LLM chat providers
//!
//! Two wire protocols share the [`ChatProvider`] contract:
//! - [`OpenAiProvider`]: Chat Completions (`/v1/chat/completions`)
//! - [`AnthropicProvider`]: Messages (`/v1/messages`)
//!
//! [`MockProvider`] scripts replies for tests.

mod anthropic;
mod error;
mod mock;
mod openai;
mod traits;
mod wire;

use std::sync::Arc;

pub use anthropic::{AnthropicProvider, ANTHROPIC_VERSION};
pub use error::{ProviderError, ProviderResult};
pub use mock::{MockMode, MockProvider, MockRequest, MockStep};
pub use openai::OpenAiProvider;
pub use traits::{ChatOptions, ChatProvider, SharedProvider};

use crate::config::{LlmConfig, ProviderKind};
use crate::http::{HttpTransport, RetryPolicy, RetryingHttpInvoker};
use crate::logging::SharedLogger;
use crate::secrets::SecretStore;

/// Per-attempt timeout for LLM calls
pub const PROVIDER_TIMEOUT_MS: u64 = 120_000;

/// Explicit key from config, else the secret store
pub fn resolve_api_key(config: &LlmConfig, secrets: &dyn SecretStore) -> ProviderResult<String> {
    config
        .api_key
        .clone()
        .filter(|key| !key.is_empty())
        .or_else(|| secrets.get(config.provider.as_str()))
        .ok_or_else(|| ProviderError::missing_api_key(config.provider.as_str()))
}

/// Build the provider for `config`
pub fn create_provider(
    config: &LlmConfig,
    transport: Arc<dyn HttpTransport>,
    secrets: &dyn SecretStore,
    logger: SharedLogger,
) -> ProviderResult<SharedProvider> {
    let api_key = resolve_api_key(config, secrets)?;
    let policy = RetryPolicy::default().with_timeout_ms(PROVIDER_TIMEOUT_MS);
    let invoker = RetryingHttpInvoker::new(transport, policy, logger.clone());

    let provider: SharedProvider = match config.provider {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(config.clone(), api_key, invoker, logger)),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(config.clone(), api_key, invoker, logger)),
    };
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockTransport;
    use crate::logging::NoOpLogger;
    use crate::secrets::MemorySecretStore;

    #[test]
    fn test_explicit_key_wins() {
        let secrets = MemorySecretStore::new().with_secret("openai", "from-store");
        let config = LlmConfig::new(ProviderKind::OpenAi, "gpt-4o").with_api_key("explicit");
        assert_eq!(resolve_api_key(&config, &secrets).unwrap(), "explicit");

        let config = LlmConfig::new(ProviderKind::OpenAi, "gpt-4o");
        assert_eq!(resolve_api_key(&config, &secrets).unwrap(), "from-store");
    }

    #[test]
    fn test_missing_key() {
        let config = LlmConfig::new(ProviderKind::Anthropic, "claude-sonnet-4");
        let err = create_provider(
            &config,
            Arc::new(MockTransport::new()),
            &MemorySecretStore::new(),
            NoOpLogger::shared(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, ProviderError::MissingApiKey { ref provider } if provider == "anthropic"));
    }

    #[test]
    fn test_factory_picks_protocol() {
        let secrets = MemorySecretStore::new()
            .with_secret("openai", "k1")
            .with_secret("anthropic", "k2");
        let transport: Arc<dyn HttpTransport> = Arc::new(MockTransport::new());

        let openai = create_provider(
            &LlmConfig::new(ProviderKind::OpenAi, "gpt-4o"),
            transport.clone(),
            &secrets,
            NoOpLogger::shared(),
        )
        .unwrap();
        assert_eq!(openai.name(), "openai");
        assert_eq!(openai.model(), "gpt-4o");

        let anthropic = create_provider(
            &LlmConfig::new(ProviderKind::Anthropic, "claude-sonnet-4"),
            transport,
            &secrets,
            NoOpLogger::shared(),
        )
        .unwrap();
        assert_eq!(anthropic.name(), "anthropic");
    }
}
