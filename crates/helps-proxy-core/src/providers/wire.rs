//! Helpers shared by both wire protocols

use std::collections::HashSet;

use serde_json::Value;

use super::error::{ProviderError, ProviderResult};
use crate::error::ProxyError;
use crate::http::{HttpRequest, RetryingHttpInvoker};
use crate::types::{CancellationToken, ToolCall, Usage};

/// Send a request through the invoker and decode the JSON reply
pub(crate) async fn send_json(
    invoker: &RetryingHttpInvoker,
    request: &HttpRequest,
    provider: &str,
    cancel: &CancellationToken,
) -> ProviderResult<Value> {
    match invoker.invoke(request, cancel).await {
        Ok(response) => response
            .json::<Value>()
            .map_err(|e| ProviderError::invalid_response(provider, format!("invalid JSON: {}", e))),
        Err(ProxyError::Response { status, body, .. }) => {
            Err(ProviderError::api_error(provider, status, error_message(&body)))
        }
        Err(ProxyError::Connection { message, .. }) => Err(ProviderError::connection(provider, message)),
        Err(ProxyError::Cancelled) => Err(ProviderError::connection(provider, "request cancelled")),
        Err(other) => Err(ProviderError::invalid_response(provider, other.to_string())),
    }
}

/// `error.message` from a provider error body, or the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(500).collect())
}

/// Fill empty ids with `call_<index>` and reject duplicates
pub(crate) fn assign_call_ids(provider: &str, mut calls: Vec<ToolCall>) -> ProviderResult<Vec<ToolCall>> {
    let mut seen = HashSet::new();
    for (index, call) in calls.iter_mut().enumerate() {
        if call.id.is_empty() {
            call.id = format!("call_{}", index);
        }
        if !seen.insert(call.id.clone()) {
            return Err(ProviderError::invalid_response(
                provider,
                format!("duplicate tool call id '{}'", call.id),
            ));
        }
    }
    Ok(calls)
}

/// Token usage from `usage.<prompt_key>` / `usage.<completion_key>`
pub(crate) fn parse_usage(body: &Value, prompt_key: &str, completion_key: &str) -> Option<Usage> {
    let usage = body.get("usage")?;
    let prompt = usage.get(prompt_key).and_then(Value::as_u64).unwrap_or(0);
    let completion = usage.get(completion_key).and_then(Value::as_u64).unwrap_or(0);
    Some(Usage::new(prompt, completion))
}

pub(crate) fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}
