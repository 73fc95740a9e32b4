//! Timeout + retry wrapper around an [`HttpTransport`]

use std::sync::Arc;

use super::retry::RetryPolicy;
use super::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::error::{ProxyError, ProxyResult};
use crate::logging::SharedLogger;
use crate::types::CancellationToken;
use crate::{log_debug, log_warn};

/// Issues requests with a per-attempt timeout and retries transient failures.
///
/// Connection errors (including timeouts) are always retried; HTTP errors
/// only when their status is in the policy's retryable set. Everything else
/// fails on the first attempt without spending retry budget.
#[derive(Clone)]
pub struct RetryingHttpInvoker {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
    logger: SharedLogger,
}

impl RetryingHttpInvoker {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy, logger: SharedLogger) -> Self {
        Self {
            transport,
            policy,
            logger,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send `request`, retrying per the policy.
    ///
    /// Returns the first 2xx response. Backoff sleeps and in-flight attempts
    /// both race `cancel`; cancellation surfaces as [`ProxyError::Cancelled`].
    pub async fn invoke(
        &self,
        request: &HttpRequest,
        cancel: &CancellationToken,
    ) -> ProxyResult<HttpResponse> {
        let mut attempt: u32 = 0;

        loop {
            let err = match self.attempt(request, cancel).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            if !err.is_retryable(&self.policy) {
                return Err(err);
            }
            if attempt >= self.policy.max_retries {
                log_warn!(
                    self.logger,
                    "[RetryingHttpInvoker] {} {} failed after {} attempts: {}",
                    request.method,
                    request.url,
                    attempt + 1,
                    err
                );
                return Err(err);
            }

            let delay = self.policy.delay_for_attempt(attempt);
            log_warn!(
                self.logger,
                "[RetryingHttpInvoker] {} {} failed (attempt {}/{}): {}; retrying in {}ms",
                request.method,
                request.url,
                attempt + 1,
                self.policy.max_retries + 1,
                err,
                delay.as_millis()
            );

            if cancel.run_until_cancelled(tokio::time::sleep(delay)).await.is_none() {
                return Err(ProxyError::Cancelled);
            }
            attempt += 1;
        }
    }

    async fn attempt(&self, request: &HttpRequest, cancel: &CancellationToken) -> ProxyResult<HttpResponse> {
        log_debug!(self.logger, "[RetryingHttpInvoker] {} {}", request.method, request.url);

        let timed = tokio::time::timeout(self.policy.timeout(), self.transport.send(request));
        match cancel.run_until_cancelled(timed).await {
            None => Err(ProxyError::Cancelled),
            Some(Err(_elapsed)) => Err(ProxyError::connection(
                &request.url,
                format!("request timed out after {}ms", self.policy.timeout_ms),
            )),
            Some(Ok(Err(err))) => Err(err),
            Some(Ok(Ok(response))) if response.is_success() => Ok(response),
            Some(Ok(Ok(response))) => Err(ProxyError::response(
                &request.url,
                response.status,
                response.body,
            )),
        }
    }
}

impl std::fmt::Debug for RetryingHttpInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingHttpInvoker")
            .field("policy", &self.policy)
            .finish()
    }
}
