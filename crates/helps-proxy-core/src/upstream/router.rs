//! Tool name + arguments → concrete upstream call

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::encoding::{build_query, encode_component, with_query};
use super::endpoints::{self, Endpoint};
use crate::catalog::ToolSource;
use crate::config::UpstreamConfig;
use crate::error::{ProxyError, ProxyResult};
use crate::http::{HttpRequest, HttpResponse, HttpTransport, RetryingHttpInvoker};
use crate::logging::SharedLogger;
use crate::types::{CancellationToken, Tool};
use crate::{log_debug, log_info};

/// How a tool call reaches the upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Dedicated REST endpoint from the static table
    Endpoint(&'static Endpoint),
    /// Generic `tools/call` envelope posted to the RPC endpoint (best effort)
    Rpc,
}

impl Route {
    pub fn for_tool(tool: &str) -> Self {
        endpoints::lookup(tool).map_or(Route::Rpc, Route::Endpoint)
    }
}

/// Dispatches tool calls and tool listing to the upstream API.
///
/// Every request goes through the [`RetryingHttpInvoker`]. No caching
/// happens here.
pub struct ToolRouter {
    upstream: UpstreamConfig,
    invoker: RetryingHttpInvoker,
    logger: SharedLogger,
}

impl ToolRouter {
    pub fn new(upstream: UpstreamConfig, transport: Arc<dyn HttpTransport>, logger: SharedLogger) -> Self {
        let invoker = RetryingHttpInvoker::new(transport, upstream.retry.clone(), logger.clone());
        Self {
            upstream,
            invoker,
            logger,
        }
    }

    pub fn upstream(&self) -> &UpstreamConfig {
        &self.upstream
    }

    /// Build the request for a tool call without sending it
    pub fn build_request(&self, tool: &str, arguments: &Map<String, Value>) -> HttpRequest {
        match Route::for_tool(tool) {
            Route::Endpoint(endpoint) => {
                let url = with_query(self.upstream.url_for(endpoint.path), &build_query(endpoint, arguments));
                HttpRequest::get(url)
            }
            Route::Rpc => HttpRequest::post_json(
                self.upstream.rpc_url(),
                json!({
                    "method": "tools/call",
                    "params": { "name": tool, "arguments": arguments },
                }),
            ),
        }
    }

    fn list_request(&self) -> HttpRequest {
        let url = format!("{}?method={}", self.upstream.rpc_url(), encode_component("tools/list"));
        HttpRequest::get(url)
    }

    /// Invoke a tool and return the raw upstream payload
    pub async fn call(
        &self,
        tool: &str,
        arguments: &Map<String, Value>,
        cancel: &CancellationToken,
    ) -> ProxyResult<Value> {
        let route = Route::for_tool(tool);
        let request = self.build_request(tool, arguments);

        match route {
            Route::Endpoint(_) => log_debug!(self.logger, "[ToolRouter] {} -> {}", tool, request.url),
            Route::Rpc => log_info!(
                self.logger,
                "[ToolRouter] {} is not in the endpoint table, using RPC fallback",
                tool
            ),
        }

        let response = self.invoker.invoke(&request, cancel).await?;
        let payload = parse_json(&response, &request.url)?;

        match route {
            Route::Endpoint(_) => Ok(payload),
            Route::Rpc => unwrap_rpc(payload),
        }
    }

    /// Fetch the tool list (uncached)
    pub async fn list_tools(&self, cancel: &CancellationToken) -> ProxyResult<Vec<Tool>> {
        let request = self.list_request();
        let response = self.invoker.invoke(&request, cancel).await?;
        let payload = unwrap_rpc(parse_json(&response, &request.url)?)?;

        let tools = payload
            .get("tools")
            .and_then(Value::as_array)
            .ok_or_else(|| ProxyError::invalid_response("tools/list response has no tools array"))?;

        let tools = tools
            .iter()
            .map(|tool| serde_json::from_value::<Tool>(tool.clone()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ProxyError::invalid_response(format!("malformed tool definition: {}", e)))?;

        log_debug!(self.logger, "[ToolRouter] upstream lists {} tools", tools.len());
        Ok(tools)
    }
}

#[async_trait]
impl ToolSource for ToolRouter {
    async fn fetch_tools(&self, cancel: &CancellationToken) -> ProxyResult<Vec<Tool>> {
        self.list_tools(cancel).await
    }
}

impl std::fmt::Debug for ToolRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRouter")
            .field("upstream", &self.upstream)
            .finish()
    }
}

fn parse_json(response: &HttpResponse, url: &str) -> ProxyResult<Value> {
    response
        .json::<Value>()
        .map_err(|e| ProxyError::invalid_response(format!("{} returned invalid JSON: {}", url, e)))
}

/// Strip a JSON-RPC style `result` wrapper; an `error` member is a contract violation
fn unwrap_rpc(payload: Value) -> ProxyResult<Value> {
    let Value::Object(mut map) = payload else {
        return Ok(payload);
    };

    if let Some(error) = map.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(ProxyError::invalid_response(format!("upstream RPC error: {}", message)));
    }

    match map.remove("result") {
        Some(result) => Ok(result),
        None => Ok(Value::Object(map)),
    }
}
