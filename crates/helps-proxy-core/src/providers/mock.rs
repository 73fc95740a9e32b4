//! Mock provider for testing
//!
//! Deterministic, scripted responses without network dependencies.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use super::error::{ProviderError, ProviderResult};
use super::traits::{ChatOptions, ChatProvider};
use crate::types::{CancellationToken, ChatMessage, ChatResult, MessageRole, Tool, ToolCall};

/// What the provider answers once its script is exhausted
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Echo back the last user message
    Echo,
    /// Return a fixed response
    Fixed(String),
    /// Request the same tool on every call
    AlwaysToolCall { tool: String, arguments: Map<String, Value> },
}

impl Default for MockMode {
    fn default() -> Self {
        MockMode::Echo
    }
}

/// One scripted step
#[derive(Debug, Clone)]
pub enum MockStep {
    Reply(ChatResult),
    Error { status: u16, message: String },
}

/// One recorded call
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<String>,
    pub options: ChatOptions,
}

/// Mock chat provider
///
/// Replays scripted steps in order, then falls back to its [`MockMode`].
/// Every call is recorded with the conversation it was sent.
#[derive(Default)]
pub struct MockProvider {
    mode: MockMode,
    script: Mutex<VecDeque<MockStep>>,
    requests: Mutex<Vec<MockRequest>>,
    calls: AtomicUsize,
    latency: Option<Duration>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: MockMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Replay `results` in order, then echo
    pub fn scripted(results: impl IntoIterator<Item = ChatResult>) -> Self {
        let provider = Self::new();
        for result in results {
            provider.push_result(result);
        }
        provider
    }

    /// Request `tool` with `arguments` on every call
    pub fn always_tool_call(tool: impl Into<String>, arguments: Value) -> Self {
        Self::with_mode(MockMode::AlwaysToolCall {
            tool: tool.into(),
            arguments: match arguments {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        })
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn push_result(&self, result: ChatResult) {
        self.script.lock().push_back(MockStep::Reply(result));
    }

    pub fn push_error(&self, status: u16, message: impl Into<String>) {
        self.script.lock().push_back(MockStep::Error {
            status,
            message: message.into(),
        });
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<MockRequest> {
        self.requests.lock().last().cloned()
    }

    fn fallback(&self, messages: &[ChatMessage], call_index: usize) -> ChatResult {
        match &self.mode {
            MockMode::Echo => {
                let last_user = messages
                    .iter()
                    .rev()
                    .find(|m| m.role == MessageRole::User)
                    .map(|m| m.content.as_str())
                    .unwrap_or("");
                ChatResult::text(format!("Echo: {}", last_user))
            }
            MockMode::Fixed(text) => ChatResult::text(text.clone()),
            MockMode::AlwaysToolCall { tool, arguments } => {
                let call = ToolCall::new(format!("mock_call_{}", call_index), tool.clone(), arguments.clone());
                ChatResult::with_tool_calls("", vec![call])
            }
        }
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[Tool],
        options: &ChatOptions,
        _cancel: &CancellationToken,
    ) -> ProviderResult<ChatResult> {
        let call_index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(MockRequest {
            messages: messages.to_vec(),
            tools: tools.iter().map(|t| t.name.clone()).collect(),
            options: options.clone(),
        });

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let step = self.script.lock().pop_front();
        match step {
            Some(MockStep::Reply(result)) => Ok(result),
            Some(MockStep::Error { status, message }) => Err(ProviderError::api_error("mock", status, message)),
            None => Ok(self.fallback(messages, call_index)),
        }
    }
}
