//! Proxy settings
//!
//! All structs deserialize from camelCase keys and default every field, so
//! an empty YAML document is a valid configuration.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use crate::http::RetryPolicy;

pub const DEFAULT_UPSTREAM_URL: &str = "https://translation-helps-mcp.pages.dev";
pub const DEFAULT_RPC_PATH: &str = "/api/mcp";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_MAX_ITERATIONS: usize = 5;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Where the upstream tool service lives and how calls to it are retried
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub rpc_path: String,
    pub retry: RetryPolicy,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_URL.to_string(),
            rpc_path: DEFAULT_RPC_PATH.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

impl UpstreamConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Absolute URL for a path relative to the base URL
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    pub fn rpc_url(&self) -> String {
        self.url_for(&self.rpc_path)
    }
}

/// Operator-configured restrictions applied to every listing and call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterConfig {
    /// Allow-list of tool names. Absent or empty means every tool is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_tools: Option<BTreeSet<String>>,
    /// Parameter names removed from schemas and from call arguments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_params: Option<BTreeSet<String>>,
    /// Drop book- and chapter-level intro notes from notes payloads
    pub filter_book_chapter_notes: bool,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled_tools = Some(tools.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_hidden_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden_params = Some(params.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_book_chapter_notes_filtered(mut self, enabled: bool) -> Self {
        self.filter_book_chapter_notes = enabled;
        self
    }

    pub fn is_tool_enabled(&self, name: &str) -> bool {
        match &self.enabled_tools {
            Some(allowed) if !allowed.is_empty() => allowed.contains(name),
            _ => true,
        }
    }

    pub fn is_param_hidden(&self, name: &str) -> bool {
        self.hidden_params
            .as_ref()
            .map(|hidden| hidden.contains(name))
            .unwrap_or(false)
    }

    pub fn has_hidden_params(&self) -> bool {
        self.hidden_params.as_ref().is_some_and(|h| !h.is_empty())
    }
}

/// Supported LLM wire protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Chat Completions protocol
    #[serde(rename = "openai")]
    OpenAi,
    /// Messages protocol
    Anthropic,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com",
            ProviderKind::Anthropic => "https://api.anthropic.com",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LLM provider settings for the tool loop
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl LlmConfig {
    pub fn new(provider: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            api_key: None,
            base_url: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Configured base URL, or the provider's public endpoint
    pub fn resolved_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }
}

// API keys stay out of Debug output
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Top-level proxy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxyConfig {
    pub upstream: UpstreamConfig,
    pub filters: FilterConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmConfig>,
    pub cache_ttl_secs: u64,
    pub max_iterations: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig::default(),
            filters: FilterConfig::default(),
            llm: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl ProxyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upstream(mut self, upstream: UpstreamConfig) -> Self {
        self.upstream = upstream;
        self
    }

    pub fn with_filters(mut self, filters: FilterConfig) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_llm(mut self, llm: LlmConfig) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    /// Reject configurations the proxy cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        validate_http_url("upstream.baseUrl", &self.upstream.base_url)?;

        if self.max_iterations == 0 {
            return Err(ConfigError::invalid("maxIterations", "must be at least 1"));
        }
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::invalid("cacheTtlSecs", "must be at least 1"));
        }

        let retry = &self.upstream.retry;
        if retry.timeout_ms == 0 {
            return Err(ConfigError::invalid("upstream.retry.timeoutMs", "must be at least 1"));
        }
        if !(retry.backoff_factor >= 1.0) {
            return Err(ConfigError::invalid(
                "upstream.retry.backoffFactor",
                format!("must be >= 1, got {}", retry.backoff_factor),
            ));
        }

        if let Some(llm) = &self.llm {
            if llm.model.trim().is_empty() {
                return Err(ConfigError::invalid("llm.model", "must not be empty"));
            }
            if let Some(url) = &llm.base_url {
                validate_http_url("llm.baseUrl", url)?;
            }
        }

        Ok(())
    }
}

fn validate_http_url(field: &str, value: &str) -> ConfigResult<()> {
    let url = reqwest::Url::parse(value)
        .map_err(|e| ConfigError::invalid(field, format!("'{}' is not an absolute URL: {}", value, e)))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(()),
        scheme => Err(ConfigError::invalid(
            field,
            format!("expected an http(s) URL, got scheme '{}'", scheme),
        )),
    }
}
