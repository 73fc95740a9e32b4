//! Scripted transport for tests

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::error::{ProxyError, ProxyResult};

/// One scripted outcome
#[derive(Debug, Clone)]
pub enum MockReply {
    Response(HttpResponse),
    ConnectionError(String),
}

struct Route {
    method: Option<HttpMethod>,
    url_fragment: String,
    reply: MockReply,
}

/// Transport that replays scripted replies and records every request.
///
/// Routes (matched by URL fragment, first match wins) answer every
/// matching request; anything else consumes the FIFO queue. With neither,
/// the send fails as a connection error.
///
/// # Example
///
/// ```
/// use helps_proxy_core::http::MockTransport;
///
/// let transport = MockTransport::new();
/// transport.push_status(503, "busy");
/// transport.push_status(200, "{}");
/// ```
#[derive(Default)]
pub struct MockTransport {
    queue: Mutex<VecDeque<MockReply>>,
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
    latency: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reply, e.g. to trip a timeout
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn push_reply(&self, reply: MockReply) {
        self.queue.lock().push_back(reply);
    }

    pub fn push_status(&self, status: u16, body: impl Into<String>) {
        self.push_reply(MockReply::Response(HttpResponse::new(status, body)));
    }

    pub fn push_json(&self, status: u16, body: &Value) {
        self.push_reply(MockReply::Response(HttpResponse::json_body(status, body)));
    }

    pub fn push_connection_error(&self, message: impl Into<String>) {
        self.push_reply(MockReply::ConnectionError(message.into()));
    }

    /// Answer every request whose URL contains `url_fragment`
    pub fn route_json(&self, url_fragment: impl Into<String>, status: u16, body: &Value) {
        self.add_route(None, url_fragment, MockReply::Response(HttpResponse::json_body(status, body)));
    }

    /// Like [`route_json`](Self::route_json), restricted to one method
    pub fn route_method_json(
        &self,
        method: HttpMethod,
        url_fragment: impl Into<String>,
        status: u16,
        body: &Value,
    ) {
        self.add_route(
            Some(method),
            url_fragment,
            MockReply::Response(HttpResponse::json_body(status, body)),
        );
    }

    pub fn add_route(&self, method: Option<HttpMethod>, url_fragment: impl Into<String>, reply: MockReply) {
        self.routes.lock().push(Route {
            method,
            url_fragment: url_fragment.into(),
            reply,
        });
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }

    /// Requests whose URL contains `url_fragment`
    pub fn requests_matching(&self, url_fragment: &str) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.url.contains(url_fragment))
            .cloned()
            .collect()
    }

    fn next_reply(&self, request: &HttpRequest) -> Option<MockReply> {
        let routed = self
            .routes
            .lock()
            .iter()
            .find(|route| {
                route.method.map_or(true, |m| m == request.method)
                    && request.url.contains(&route.url_fragment)
            })
            .map(|route| route.reply.clone());
        routed.or_else(|| self.queue.lock().pop_front())
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: &HttpRequest) -> ProxyResult<HttpResponse> {
        self.requests.lock().push(request.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match self.next_reply(request) {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::ConnectionError(message)) => Err(ProxyError::connection(&request.url, message)),
            None => Err(ProxyError::connection(&request.url, "no scripted reply")),
        }
    }
}
