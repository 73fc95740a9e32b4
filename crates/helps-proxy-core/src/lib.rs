//! Helps Proxy Core
//!
//! Runtime-agnostic core of the translation helps proxy. It sits between an
//! LLM (or a protocol front-end) and the upstream translation-helps API:
//! routing tool calls, normalizing the heterogeneous responses into
//! plain-text content, filtering tools and payloads, and driving the
//! ask/execute loop against two LLM wire protocols.
//!
//! Front-ends (stdio server, HTTP/SSE server, OpenAI-compatible endpoint)
//! live elsewhere and talk to this crate through [`HelpsProxy`].
//!
//! ## Tool calls
//!
//! ```rust,ignore
//! use helps_proxy_core::{HelpsProxy, ProxyConfig};
//!
//! let proxy = HelpsProxy::builder(ProxyConfig::default()).build()?;
//! let tools = proxy.list_tools().await?;
//! let content = proxy.call_tool("fetch_scripture", &args).await?;
//! println!("{}", content.joined_text());
//! ```
//!
//! ## Chat with tools
//!
//! ```rust,ignore
//! use helps_proxy_core::execution::FnObserver;
//!
//! let observer = FnObserver::new()
//!     .with_tool_calls(|i, calls| println!("round {i}: {} calls", calls.len()));
//! let outcome = proxy
//!     .chat(messages, &ChatOptions::new(), &observer, &CancellationToken::new())
//!     .await?;
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod execution;
pub mod filter;
pub mod http;
pub mod logging;
pub mod normalize;
pub mod providers;
pub mod proxy;
pub mod secrets;
pub mod service;
pub mod types;
pub mod upstream;

// Re-export commonly used types
pub use types::{
    CancellationToken, CanonicalContent, ChatMessage, ChatResult, ContentBlock, FinishReason, InputSchema,
    MessageRole, Tool, ToolCall, ToolResult, Usage,
};

pub use error::{ProxyError, ProxyResult};

pub use config::{ConfigError, ConfigUpdate, FileConfigSource, FilterConfig, LlmConfig, ProviderKind, ProxyConfig};

pub use logging::{init_tracing, Logger, NoOpLogger, SharedLogger, TracingLogger};

pub use secrets::{EnvSecretStore, MemorySecretStore, SecretStore};

pub use providers::{create_provider, ChatOptions, ChatProvider, ProviderError};

pub use execution::{ChatOutcome, LoopObserver, ToolExecutionLoop};

pub use normalize::normalize;

pub use proxy::{HelpsProxy, HelpsProxyBuilder};
pub use service::ToolService;
