//! Crate-level error taxonomy
//!
//! Every boundary matches on [`ProxyError`] exhaustively; there is no
//! catch-all variant.

use thiserror::Error;

use crate::config::ConfigError;
use crate::http::RetryPolicy;
use crate::providers::ProviderError;

/// Errors surfaced by the routing layer, the tool pipeline and the tool loop
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Network unreachable, DNS failure or per-attempt timeout
    #[error("Connection to {url} failed: {message}")]
    Connection { url: String, message: String },

    /// Non-2xx status after the retry budget was spent (or a non-retryable status)
    #[error("Upstream returned HTTP {status} for {url}")]
    Response { url: String, status: u16, body: String },

    /// Body was not JSON, or lacked the members the contract requires
    #[error("Invalid upstream response: {0}")]
    InvalidUpstreamResponse(String),

    #[error("Tool not found: {name}")]
    ToolNotFound { name: String },

    #[error("Tool is disabled: {name}")]
    ToolDisabled { name: String },

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The tool loop kept requesting tools until its iteration cap
    #[error("Tool loop did not finish within {max_iterations} iterations")]
    MaxIterations { max_iterations: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Request cancelled")]
    Cancelled,
}

impl ProxyError {
    pub fn connection(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn response(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Response {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidUpstreamResponse(message.into())
    }

    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolNotFound { name: name.into() }
    }

    pub fn tool_disabled(name: impl Into<String>) -> Self {
        Self::ToolDisabled { name: name.into() }
    }

    pub fn invalid_arguments(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// HTTP status attached to this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            Self::Provider(err) => err.status(),
            _ => None,
        }
    }

    /// Whether the invoker may spend another attempt on this error
    pub fn is_retryable(&self, policy: &RetryPolicy) -> bool {
        match self {
            Self::Connection { .. } => true,
            Self::Response { status, .. } => policy.is_retryable_status(*status),
            _ => false,
        }
    }

    pub fn is_max_iterations(&self) -> bool {
        matches!(self, Self::MaxIterations { .. })
    }

    /// Caller-input errors: surfaced immediately, never retried
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::ToolNotFound { .. } | Self::ToolDisabled { .. } | Self::InvalidArguments { .. }
        )
    }
}

pub type ProxyResult<T> = Result<T, ProxyError>;
