//! Proxy configuration
//!
//! - `ProxyConfig`: upstream location, retry policy, filters, LLM settings
//! - `FileConfigSource`: YAML file-based (user/workspace level)
//! - `ConfigUpdate`: runtime partial updates

mod error;
mod file;
mod settings;
mod update;

pub use error::{ConfigError, ConfigResult};
pub use file::{parse_yaml, ConfigLevel, FileConfigSource};
pub use settings::{
    FilterConfig, LlmConfig, ProviderKind, ProxyConfig, UpstreamConfig, DEFAULT_CACHE_TTL_SECS,
    DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_TOKENS, DEFAULT_RPC_PATH, DEFAULT_UPSTREAM_URL,
};
pub use update::ConfigUpdate;
