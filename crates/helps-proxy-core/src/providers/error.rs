//! Provider error types

use thiserror::Error;

/// Errors raised while talking to an LLM provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Missing API key
    #[error("API key is required for {provider}")]
    MissingApiKey { provider: String },

    /// Provider answered with a non-2xx status
    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    /// Network failure or timeout before any response
    #[error("{provider} connection failed: {message}")]
    Connection { provider: String, message: String },

    /// Response had no choice / content array
    #[error("{provider} returned no output")]
    NoOutput { provider: String },

    /// Tool-call arguments could not be decoded
    #[error("{provider} sent malformed arguments for tool {tool}: {message}")]
    InvalidToolArguments {
        provider: String,
        tool: String,
        message: String,
    },

    /// Invalid response from provider
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },
}

impl ProviderError {
    pub fn api_error(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    pub fn connection(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn no_output(provider: impl Into<String>) -> Self {
        Self::NoOutput {
            provider: provider.into(),
        }
    }

    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// HTTP status returned by the provider, if the failure carried one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ProviderError::api_error("openai", 429, "slow down");
        assert_eq!(err.to_string(), "openai API error (429): slow down");
        assert_eq!(err.status(), Some(429));

        let err = ProviderError::no_output("anthropic");
        assert_eq!(err.to_string(), "anthropic returned no output");
        assert_eq!(err.status(), None);
    }
}
