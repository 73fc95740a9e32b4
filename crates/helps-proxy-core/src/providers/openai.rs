//! Chat Completions wire protocol

use async_trait::async_trait;
use serde_json::{json, Map, Value};

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

const PROVIDER: &str = "openai";

static NULL: Value = Value::Null;

/// Provider for the OpenAI Chat Completions API and compatible servers
pub struct OpenAiProvider {
    config: LlmConfig,
    api_key: String,
    invoker: RetryingHttpInvoker,
    logger: SharedLogger,
}

impl OpenAiProvider {
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
        format!("{}/v1/chat/completions", self.config.resolved_base_url().trim_end_matches('/'))
    }

    pub fn build_request_body(&self, messages: &[ChatMessage], tools: &[Tool], options: &ChatOptions) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "messages": messages.iter().map(message_to_wire).collect::<Vec<_>>(),
            "max_tokens": options.max_tokens.unwrap_or(self.config.max_tokens),
        });

        if let Some(temperature) = options.temperature.or(self.config.temperature) {
            body["temperature"] = json!(temperature);
        }

        if !tools.is_empty() {
            let wire_tools: Vec<Value> = tools
                .iter()
                .map(|tool| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": tool.name,
                            "description": tool.description,
                            "parameters": tool.input_schema.to_value(),
                        }
                    })
                })
                .collect();
            body["tools"] = Value::Array(wire_tools);
        }

        body
    }
}

fn message_to_wire(message: &ChatMessage) -> Value {
    match message.role {
        MessageRole::Tool => json!({
            "role": "tool",
            "tool_call_id": message.tool_call_id.as_deref().unwrap_or_default(),
            "content": message.content,
        }),
        MessageRole::Assistant if message.has_tool_calls() => {
            let calls: Vec<Value> = message
                .tool_calls
                .iter()
                .map(|call| {
                    json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": call.name,
                            "arguments": Value::Object(call.arguments.clone()).to_string(),
                        }
                    })
                })
                .collect();
            let content = if message.content.is_empty() {
                Value::Null
            } else {
                json!(message.content)
            };
            json!({ "role": "assistant", "content": content, "tool_calls": calls })
        }
        role => json!({ "role": role.to_string(), "content": message.content }),
    }
}

fn map_finish_reason(reason: Option<&str>) -> Option<FinishReason> {
    match reason? {
        "stop" => Some(FinishReason::Stop),
        "length" => Some(FinishReason::Length),
        "tool_calls" | "function_call" => Some(FinishReason::ToolCalls),
        "content_filter" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}

/// Decode a `function.arguments` JSON string into an argument map
fn parse_arguments(tool: &str, raw: &Value) -> ProviderResult<Map<String, Value>> {
    let invalid = |message: String| ProviderError::InvalidToolArguments {
        provider: PROVIDER.to_string(),
        tool: tool.to_string(),
        message,
    };

    let parsed = match raw {
        Value::Null => return Ok(Map::new()),
        Value::String(s) if s.trim().is_empty() => return Ok(Map::new()),
        Value::String(s) => serde_json::from_str::<Value>(s).map_err(|e| invalid(e.to_string()))?,
        other => other.clone(),
    };

    match parsed {
        Value::Object(map) => Ok(map),
        other => Err(invalid(format!("expected a JSON object, got {}", other))),
    }
}

/// Normalize a Chat Completions response body
pub fn parse_response(body: &Value) -> ProviderResult<ChatResult> {
    let choice = body
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or_else(|| ProviderError::no_output(PROVIDER))?;

    let message = choice
        .get("message")
        .ok_or_else(|| ProviderError::no_output(PROVIDER))?;
    let content = str_field(message, "content").to_string();

    let calls = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .map(|calls| {
            calls
                .iter()
                .map(|call| {
                    let function = call.get("function").unwrap_or(&NULL);
                    let name = str_field(function, "name");
                    let arguments = parse_arguments(name, function.get("arguments").unwrap_or(&NULL))?;
                    Ok(ToolCall::new(str_field(call, "id"), name, arguments))
                })
                .collect::<ProviderResult<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();
    let tool_calls = assign_call_ids(PROVIDER, calls)?;

    let message = if tool_calls.is_empty() {
        ChatMessage::assistant(content)
    } else {
        ChatMessage::assistant_with_tool_calls(content, tool_calls.clone())
    };

    Ok(ChatResult {
        message,
        finish_reason: map_finish_reason(choice.get("finish_reason").and_then(Value::as_str)),
        tool_calls,
        usage: parse_usage(body, "prompt_tokens", "completion_tokens"),
    })
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
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
            "[OpenAiProvider] POST {} model={} messages={} tools={}",
            url,
            self.config.model,
            messages.len(),
            tools.len()
        );

        let request = HttpRequest::post_json(url, self.build_request_body(messages, tools, options))
            .with_header("Authorization", format!("Bearer {}", self.api_key));
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

    fn provider(transport: &Arc<MockTransport>) -> OpenAiProvider {
        let config = LlmConfig::new(ProviderKind::OpenAi, "gpt-4o-mini").with_base_url("http://llm.test/");
        let invoker = RetryingHttpInvoker::new(
            transport.clone(),
            RetryPolicy::no_retries(),
            NoOpLogger::shared(),
        );
        OpenAiProvider::new(config, "sk-test", invoker, NoOpLogger::shared())
    }

    #[test]
    fn test_request_body() {
        let transport = Arc::new(MockTransport::new());
        let provider = provider(&transport);

        let call = ToolCall::from_value("call_1", "fetch_scripture", json!({"reference": "John 3:16"}));
        let messages = vec![
            ChatMessage::system("Be brief"),
            ChatMessage::user("What does John 3:16 say?"),
            ChatMessage::assistant_with_tool_calls("", vec![call.clone()]),
            ChatMessage::tool_result(&ToolResult::success(&call, "For God so loved")),
        ];
        let tools = vec![Tool::new("fetch_scripture", "Fetch scripture")
            .with_property("reference", json!({"type": "string"}), true)];

        let body = provider.build_request_body(&messages, &tools, &ChatOptions::new().with_temperature(0.5));

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["messages"][0], json!({"role": "system", "content": "Be brief"}));
        assert_eq!(body["messages"][2]["content"], Value::Null);
        assert_eq!(
            body["messages"][2]["tool_calls"][0]["function"]["arguments"],
            r#"{"reference":"John 3:16"}"#
        );
        assert_eq!(
            body["messages"][3],
            json!({"role": "tool", "tool_call_id": "call_1", "content": "For God so loved"})
        );
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["parameters"]["required"], json!(["reference"]));
        assert_eq!(provider.endpoint(), "http://llm.test/v1/chat/completions");
    }

    #[test]
    fn test_parse_tool_calls() {
        let body = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [
                        {"id": "call_a", "type": "function", "function": {"name": "fetch_scripture", "arguments": "{\"reference\":\"Gen 1:1\"}"}},
                        {"id": "", "type": "function", "function": {"name": "get_languages", "arguments": ""}}
                    ]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 20, "completion_tokens": 7, "total_tokens": 27}
        });

        let result = parse_response(&body).unwrap();
        assert_eq!(result.finish_reason, Some(FinishReason::ToolCalls));
        assert_eq!(result.tool_calls.len(), 2);
        assert_eq!(result.tool_calls[0].get_arg_str("reference"), Some("Gen 1:1"));
        assert_eq!(result.tool_calls[1].id, "call_1");
        assert!(result.tool_calls[1].arguments.is_empty());
        assert_eq!(result.usage.unwrap().total_tokens, 27);
        assert!(result.message.has_tool_calls());
    }

    #[test]
    fn test_malformed_arguments_are_an_error() {
        let body = json!({
            "choices": [{
                "message": {"tool_calls": [{"id": "c", "function": {"name": "fetch_scripture", "arguments": "{not json"}}]},
                "finish_reason": "tool_calls"
            }]
        });
        assert!(matches!(
            parse_response(&body),
            Err(ProviderError::InvalidToolArguments { ref tool, .. }) if tool == "fetch_scripture"
        ));
    }

    #[test]
    fn test_missing_choices_is_no_output() {
        assert!(matches!(parse_response(&json!({"choices": []})), Err(ProviderError::NoOutput { .. })));
        assert!(matches!(parse_response(&json!({})), Err(ProviderError::NoOutput { .. })));
    }

    #[test]
    fn test_finish_reason_mapping() {
        assert_eq!(map_finish_reason(Some("stop")), Some(FinishReason::Stop));
        assert_eq!(map_finish_reason(Some("function_call")), Some(FinishReason::ToolCalls));
        assert_eq!(map_finish_reason(Some("something_new")), None);
        assert_eq!(map_finish_reason(None), None);
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(
            200,
            &json!({"choices": [{"message": {"role": "assistant", "content": "Hello!"}, "finish_reason": "stop"}]}),
        );

        let result = provider(&transport)
            .chat(&[ChatMessage::user("Hi")], &[], &ChatOptions::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.message.content, "Hello!");
        assert_eq!(result.finish_reason, Some(FinishReason::Stop));

        let request = transport.last_request().unwrap();
        assert_eq!(request.header("authorization"), Some("Bearer sk-test"));
        assert!(request.body.unwrap().get("tools").is_none());
    }

    #[tokio::test]
    async fn test_http_error_is_api_error() {
        let transport = Arc::new(MockTransport::new());
        transport.push_status(401, r#"{"error":{"message":"Incorrect API key"}}"#);

        let err = provider(&transport)
            .chat(&[ChatMessage::user("Hi")], &[], &ChatOptions::new(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("Incorrect API key"));
    }
}
