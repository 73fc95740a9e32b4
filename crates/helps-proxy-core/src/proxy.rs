//! Front-end facing surface
//!
//! [`HelpsProxy`] wires the router, catalog, tool pipeline and chat provider
//! together. Transport front-ends (stdio, HTTP, OpenAI-compatible endpoints)
//! talk to the core only through this type.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::catalog::ToolCatalog;
use crate::config::{ConfigError, ConfigUpdate, ProxyConfig};
use crate::error::ProxyResult;
use crate::execution::{ChatOutcome, LoopObserver, ToolExecutionLoop};
use crate::http::{HttpTransport, ReqwestTransport};
use crate::logging::{SharedLogger, TracingLogger};
use crate::providers::{create_provider, ChatOptions, SharedProvider};
use crate::secrets::{EnvSecretStore, SecretStore};
use crate::service::ToolService;
use crate::types::{CancellationToken, CanonicalContent, ChatMessage, Tool};
use crate::upstream::ToolRouter;
use crate::{log_debug, log_info, log_warn};

/// Builder for [`HelpsProxy`]
///
/// Every collaborator has a production default: `TracingLogger`,
/// `ReqwestTransport`, `EnvSecretStore`, and a provider built from
/// `config.llm` when one is configured.
pub struct HelpsProxyBuilder {
    config: ProxyConfig,
    logger: Option<SharedLogger>,
    transport: Option<Arc<dyn HttpTransport>>,
    provider: Option<SharedProvider>,
    secrets: Option<Arc<dyn SecretStore>>,
}

impl HelpsProxyBuilder {
    pub fn logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use this provider instead of building one from `config.llm`.
    ///
    /// An explicit provider is kept across LLM config updates.
    pub fn provider(mut self, provider: SharedProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn secrets(mut self, secrets: Arc<dyn SecretStore>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    pub fn build(self) -> ProxyResult<HelpsProxy> {
        self.config.validate()?;

        let logger = self
            .logger
            .unwrap_or_else(|| Arc::new(TracingLogger::with_component("helps-proxy")));
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::new()));
        let secrets = self.secrets.unwrap_or_else(|| Arc::new(EnvSecretStore::new()));

        let pinned_provider = self.provider.is_some();
        let provider = match (self.provider, &self.config.llm) {
            (Some(provider), _) => Some(provider),
            (None, Some(llm)) => Some(create_provider(llm, transport.clone(), secrets.as_ref(), logger.clone())?),
            (None, None) => None,
        };

        let router = Arc::new(ToolRouter::new(
            self.config.upstream.clone(),
            transport.clone(),
            logger.clone(),
        ));
        let catalog = Arc::new(ToolCatalog::new(
            router.clone(),
            Duration::from_secs(self.config.cache_ttl_secs),
            logger.clone(),
        ));
        let service = Arc::new(ToolService::new(
            router,
            catalog,
            self.config.filters.clone(),
            logger.clone(),
        ));

        log_info!(
            logger,
            "[HelpsProxy] upstream {}, provider {}",
            self.config.upstream.base_url,
            provider.as_ref().map_or("none", |p| p.name())
        );

        Ok(HelpsProxy {
            config: RwLock::new(self.config),
            service,
            provider: RwLock::new(provider),
            pinned_provider,
            transport,
            secrets,
            logger,
        })
    }
}

pub struct HelpsProxy {
    config: RwLock<ProxyConfig>,
    service: Arc<ToolService>,
    provider: RwLock<Option<SharedProvider>>,
    pinned_provider: bool,
    transport: Arc<dyn HttpTransport>,
    secrets: Arc<dyn SecretStore>,
    logger: SharedLogger,
}

impl HelpsProxy {
    pub fn builder(config: ProxyConfig) -> HelpsProxyBuilder {
        HelpsProxyBuilder {
            config,
            logger: None,
            transport: None,
            provider: None,
            secrets: None,
        }
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> ProxyConfig {
        self.config.read().clone()
    }

    pub fn service(&self) -> &Arc<ToolService> {
        &self.service
    }

    pub fn provider(&self) -> Option<SharedProvider> {
        self.provider.read().clone()
    }

    /// Tools visible under the current filters
    pub async fn list_tools(&self) -> ProxyResult<Vec<Tool>> {
        self.service.list_tools(&CancellationToken::new()).await
    }

    pub async fn call_tool(&self, name: &str, arguments: &Map<String, Value>) -> ProxyResult<CanonicalContent> {
        self.service.call_tool(name, arguments, &CancellationToken::new()).await
    }

    /// Run the tool loop over `messages` with the filtered tool menu
    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        options: &ChatOptions,
        observer: &dyn LoopObserver,
        cancel: &CancellationToken,
    ) -> ProxyResult<ChatOutcome> {
        let provider = self
            .provider()
            .ok_or_else(|| ConfigError::invalid("llm", "no LLM provider is configured"))?;
        let max_iterations = self.config.read().max_iterations;

        let tools = self.service.list_tools(cancel).await?;
        log_debug!(
            self.logger,
            "[HelpsProxy] chat via {} with {} tools",
            provider.name(),
            tools.len()
        );

        ToolExecutionLoop::new(provider, self.service.clone(), max_iterations, self.logger.clone())
            .run(messages, &tools, options, observer, cancel)
            .await
    }

    /// Apply a partial update.
    ///
    /// Validation happens before anything changes; on error the previous
    /// configuration stays in effect.
    pub fn update_config(&self, update: ConfigUpdate) -> ProxyResult<ProxyConfig> {
        let next = update.apply_to(&self.config())?;

        if update.touches_llm() && !self.pinned_provider {
            if let Some(llm) = &next.llm {
                let provider = create_provider(llm, self.transport.clone(), self.secrets.as_ref(), self.logger.clone())?;
                *self.provider.write() = Some(provider);
                log_info!(self.logger, "[HelpsProxy] provider rebuilt for model {}", llm.model);
            }
        }

        self.service.set_filters(next.filters.clone());
        *self.config.write() = next.clone();
        log_info!(self.logger, "[HelpsProxy] configuration updated");
        Ok(next)
    }

    /// Whether the upstream answers `tools/list`; bypasses the cache
    pub async fn test_connection(&self) -> bool {
        match self.service.router().list_tools(&CancellationToken::new()).await {
            Ok(tools) => {
                log_debug!(self.logger, "[HelpsProxy] upstream reachable, {} tools", tools.len());
                true
            }
            Err(err) => {
                log_warn!(self.logger, "[HelpsProxy] upstream unreachable: {}", err);
                false
            }
        }
    }

    pub fn clear_cache(&self) {
        self.service.catalog().clear_cache();
    }
}

impl std::fmt::Debug for HelpsProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelpsProxy")
            .field("config", &*self.config.read())
            .field("service", &self.service)
            .field("secrets", &self.secrets.name())
            .finish()
    }
}
