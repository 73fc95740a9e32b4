//! Chat provider trait definition

use std::sync::Arc;

use async_trait::async_trait;

use super::error::ProviderResult;
use crate::types::{CancellationToken, ChatMessage, ChatResult, Tool};

/// Per-request generation options; unset fields fall back to the provider's config
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    /// Temperature for response generation (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// One LLM wire protocol
///
/// Implementations translate the shared conversation model to their wire
/// format and normalize the reply into a [`ChatResult`].
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name (e.g., "openai", "anthropic")
    fn name(&self) -> &str;

    /// Model identifier sent on every request
    fn model(&self) -> &str;

    /// Send one conversation turn
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[Tool],
        options: &ChatOptions,
        cancel: &CancellationToken,
    ) -> ProviderResult<ChatResult>;
}

pub type SharedProvider = Arc<dyn ChatProvider>;
