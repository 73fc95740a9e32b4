//! Messages wire protocol

use async_trait::async_trait;
use serde_json::{json, Value};

use super::error::{ProviderError, ProviderResult};
use super::traits::{ChatOptions, ChatProvider};
use super::wire::{assign_call_ids, parse_usage, send_json, str_field};
use crate::config::LlmConfig;
use crate::http::{HttpRequest, RetryingHttpInvoker};
use crate::log_debug;
use crate::logging::SharedLogger;
use crate::types::{
    CancellationToken, ChatMessage, ChatResult, FinishReason, MessageRole, Tool, ToolCall,
};

const PROVIDER: &str = "anthropic";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Provider for the Anthropic Messages API
pub struct AnthropicProvider {
    config: LlmConfig,
    api_key: String,
    invoker: RetryingHttpInvoker,
    logger: SharedLogger,
}

impl AnthropicProvider {
    pub fn new(
        config: LlmConfig,
        api_key: impl Into<String>,
        invoker: RetryingHttpInvoker,
        logger: SharedLogger,
    ) -> Self {
        Self {
            config,
            api_key: api_key.into(),
            invoker,
            logger,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.resolved_base_url().trim_end_matches('/'))
    }

    /// System messages move to the top-level `system` field; runs of tool
    /// results collapse into a single user turn of `tool_result` blocks.
    pub fn build_request_body(&self, messages: &[ChatMessage], tools: &[Tool], options: &ChatOptions) -> Value {
        let mut system_parts: Vec<&str> = Vec::new();
        let mut wire: Vec<Value> = Vec::new();
        let mut pending_results: Vec<Value> = Vec::new();

        for message in messages {
            if message.role != MessageRole::Tool && !pending_results.is_empty() {
                wire.push(json!({ "role": "user", "content": std::mem::take(&mut pending_results) }));
            }

            match message.role {
                MessageRole::System => system_parts.push(&message.content),
                MessageRole::User => wire.push(json!({ "role": "user", "content": message.content })),
                MessageRole::Assistant if message.has_tool_calls() => {
                    let mut blocks = Vec::new();
                    if !message.content.is_empty() {
                        blocks.push(json!({ "type": "text", "text": message.content }));
                    }
                    blocks.extend(message.tool_calls.iter().map(|call| {
                        json!({
                            "type": "tool_use",
                            "id": call.id,
                            "name": call.name,
                            "input": call.arguments,
                        })
                    }));
                    wire.push(json!({ "role": "assistant", "content": blocks }));
                }
                MessageRole::Assistant => {
                    wire.push(json!({ "role": "assistant", "content": message.content }))
                }
                MessageRole::Tool => pending_results.push(json!({
                    "type": "tool_result",
                    "tool_use_id": message.tool_call_id.as_deref().unwrap_or_default(),
                    "content": message.content,
                    "is_error": message.is_error,
                })),
            }
        }
        if !pending_results.is_empty() {
            wire.push(json!({ "role": "user", "content": pending_results }));
        }

        let mut body = json!({
            "model": self.config.model,
            "max_tokens": options.max_tokens.unwrap_or(self.config.max_tokens),
            "messages": wire,
        });

        if !system_parts.is_empty() {
            body["system"] = json!(system_parts.join("\n\n"));
        }
        if let Some(temperature) = options.temperature.or(self.config.temperature) {
            body["temperature"] = json!(temperature);
        }
        if !tools.is_empty() {
            let wire_tools: Vec<Value> = tools
                .iter()
                .map(|tool| {
                    json!({
                        "name": tool.name,
                        "description": tool.description,
                        "input_schema": tool.input_schema.to_value(),
                    })
                })
                .collect();
            body["tools"] = Value::Array(wire_tools);
        }

        body
    }
}

fn map_stop_reason(reason: Option<&str>) -> Option<FinishReason> {
    match reason? {
        "end_turn" | "stop_sequence" => Some(FinishReason::Stop),
        "max_tokens" => Some(FinishReason::MaxTokens),
        "tool_use" => Some(FinishReason::ToolCalls),
        "refusal" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}

/// Normalize a Messages API response body
pub fn parse_response(body: &Value) -> ProviderResult<ChatResult> {
    let blocks = body
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::no_output(PROVIDER))?;

    let mut text = String::new();
    let mut calls = Vec::new();
    for block in blocks {
        match str_field(block, "type") {
            "text" => text.push_str(str_field(block, "text")),
            "tool_use" => {
                let name = str_field(block, "name");
                let arguments = match block.get("input") {
                    Some(Value::Object(map)) => map.clone(),
                    None | Some(Value::Null) => Default::default(),
                    Some(other) => {
                        return Err(ProviderError::InvalidToolArguments {
                            provider: PROVIDER.to_string(),
                            tool: name.to_string(),
                            message: format!("expected an object, got {}", other),
                        })
                    }
                };
                calls.push(ToolCall::new(str_field(block, "id"), name, arguments));
            }
            _ => {}
        }
    }
    let tool_calls = assign_call_ids(PROVIDER, calls)?;

    let message = if tool_calls.is_empty() {
        ChatMessage::assistant(text)
    } else {
        ChatMessage::assistant_with_tool_calls(text, tool_calls.clone())
    };

    Ok(ChatResult {
        message,
        finish_reason: map_stop_reason(body.get("stop_reason").and_then(Value::as_str)),
        tool_calls,
        usage: parse_usage(body, "input_tokens", "output_tokens"),
    })
}

#[async_trait]
impl ChatProvider for AnthropicProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[Tool],
        options: &ChatOptions,
        cancel: &CancellationToken,
    ) -> ProviderResult<ChatResult> {
        let url = self.endpoint();
        log_debug!(
            self.logger,
            "[AnthropicProvider] POST {} model={} messages={} tools={}",
            url,
            self.config.model,
            messages.len(),
            tools.len()
        );

        let request = HttpRequest::post_json(url, self.build_request_body(messages, tools, options))
            .with_header("x-api-key", self.api_key.as_str())
            .with_header("anthropic-version", ANTHROPIC_VERSION);
        let body = send_json(&self.invoker, &request, PROVIDER, cancel).await?;
        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;
    use crate::http::{MockTransport, RetryPolicy};
    use crate::logging::NoOpLogger;
    use crate::types::ToolResult;
    use std::sync::Arc;

    fn provider(transport: &Arc<MockTransport>) -> AnthropicProvider {
        let config = LlmConfig::new(ProviderKind::Anthropic, "claude-sonnet-4")
            .with_base_url("http://llm.test")
            .with_max_tokens(1024);
        let invoker = RetryingHttpInvoker::new(
            transport.clone(),
            RetryPolicy::no_retries(),
            NoOpLogger::shared(),
        );
        AnthropicProvider::new(config, "sk-ant-test", invoker, NoOpLogger::shared())
    }

    #[test]
    fn test_request_body_layout() {
        let transport = Arc::new(MockTransport::new());
        let first = ToolCall::from_value("tu_1", "fetch_scripture", json!({"reference": "John 3:16"}));
        let second = ToolCall::from_value("tu_2", "fetch_translation_notes", json!({"reference": "John 3:16"}));

        let messages = vec![
            ChatMessage::system("You are a translation helper"),
            ChatMessage::user("Explain John 3:16"),
            ChatMessage::assistant_with_tool_calls("Looking it up", vec![first.clone(), second.clone()]),
            ChatMessage::tool_result(&ToolResult::success(&first, "For God so loved")),
            ChatMessage::tool_result(&ToolResult::error(&second, "upstream down")),
        ];
        let tools = vec![Tool::new("fetch_scripture", "Fetch scripture")];

        let body = provider(&transport).build_request_body(&messages, &tools, &ChatOptions::new());

        assert_eq!(body["system"], "You are a translation helper");
        assert_eq!(body["max_tokens"], 1024);
        assert!(body.get("temperature").is_none());

        let wire = body["messages"].as_array().unwrap();
        assert_eq!(wire.len(), 3);
        assert_eq!(wire[0], json!({"role": "user", "content": "Explain John 3:16"}));

        assert_eq!(wire[1]["content"][0], json!({"type": "text", "text": "Looking it up"}));
        assert_eq!(wire[1]["content"][1]["type"], "tool_use");
        assert_eq!(wire[1]["content"][2]["input"], json!({"reference": "John 3:16"}));

        let results = wire[2]["content"].as_array().unwrap();
        assert_eq!(wire[2]["role"], "user");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["tool_use_id"], "tu_1");
        assert_eq!(results[0]["is_error"], false);
        assert_eq!(results[1]["is_error"], true);
        assert_eq!(results[1]["content"], "Error: upstream down");

        assert_eq!(body["tools"][0]["input_schema"]["type"], "object");
    }

    #[test]
    fn test_parse_tool_use() {
        let body = json!({
            "content": [
                {"type": "text", "text": "Let me check."},
                {"type": "tool_use", "id": "toolu_1", "name": "fetch_scripture", "input": {"reference": "Gen 1:1"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 30, "output_tokens": 12}
        });

        let result = parse_response(&body).unwrap();
        assert_eq!(result.message.content, "Let me check.");
        assert_eq!(result.finish_reason, Some(FinishReason::ToolCalls));
        assert_eq!(result.tool_calls[0].id, "toolu_1");
        assert_eq!(result.tool_calls[0].get_arg_str("reference"), Some("Gen 1:1"));
        assert_eq!(result.usage.unwrap().total_tokens, 42);
    }

    #[test]
    fn test_stop_reason_mapping() {
        assert_eq!(map_stop_reason(Some("end_turn")), Some(FinishReason::Stop));
        assert_eq!(map_stop_reason(Some("stop_sequence")), Some(FinishReason::Stop));
        assert_eq!(map_stop_reason(Some("max_tokens")), Some(FinishReason::MaxTokens));
        assert_eq!(map_stop_reason(Some("refusal")), Some(FinishReason::ContentFilter));
        assert_eq!(map_stop_reason(Some("pause_turn")), None);
    }

    #[test]
    fn test_missing_content_is_no_output() {
        assert!(matches!(
            parse_response(&json!({"stop_reason": "end_turn"})),
            Err(ProviderError::NoOutput { .. })
        ));
    }

    #[tokio::test]
    async fn test_chat_sends_auth_headers() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, &json!({"content": [{"type": "text", "text": "Hi"}], "stop_reason": "end_turn"}));

        let result = provider(&transport)
            .chat(&[ChatMessage::user("Hello")], &[], &ChatOptions::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.message.content, "Hi");

        let request = transport.last_request().unwrap();
        assert_eq!(request.url, "http://llm.test/v1/messages");
        assert_eq!(request.header("x-api-key"), Some("sk-ant-test"));
        assert_eq!(request.header("anthropic-version"), Some(ANTHROPIC_VERSION));
    }
}
