//! Ask / execute / append state machine

use std::sync::Arc;

use super::context::ExecutionContext;
use super::executor::{execute_batch, ToolExecutor};
use super::hooks::LoopObserver;
use crate::error::{ProxyError, ProxyResult};
use crate::logging::SharedLogger;
use crate::providers::{ChatOptions, SharedProvider};
use crate::types::{CancellationToken, ChatMessage, ChatResult, Tool};
use crate::{log_debug, log_warn};

/// Result of a completed loop run
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// The provider's final answer, unchanged
    pub result: ChatResult,
    /// Full conversation, including tool rounds
    pub messages: Vec<ChatMessage>,
    /// Tool rounds executed before the final answer
    pub iterations: usize,
}

/// Drives a conversation until the model stops requesting tools.
///
/// Each round the provider sees the whole conversation plus the tool menu.
/// Requested calls run concurrently through the [`ToolExecutor`]; their
/// results are appended in request order. After `max_iterations` rounds
/// without a final answer the run fails with [`ProxyError::MaxIterations`].
pub struct ToolExecutionLoop {
    provider: SharedProvider,
    executor: Arc<dyn ToolExecutor>,
    max_iterations: usize,
    logger: SharedLogger,
}

impl ToolExecutionLoop {
    pub fn new(
        provider: SharedProvider,
        executor: Arc<dyn ToolExecutor>,
        max_iterations: usize,
        logger: SharedLogger,
    ) -> Self {
        Self {
            provider,
            executor,
            max_iterations,
            logger,
        }
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub async fn run(
        &self,
        messages: Vec<ChatMessage>,
        tools: &[Tool],
        options: &ChatOptions,
        observer: &dyn LoopObserver,
        cancel: &CancellationToken,
    ) -> ProxyResult<ChatOutcome> {
        let mut ctx = ExecutionContext::new(messages, self.max_iterations);

        loop {
            let response = self.ask(&ctx, tools, options, cancel).await?;

            if !response.has_tool_calls() {
                log_debug!(
                    self.logger,
                    "[ToolExecutionLoop] finished after {} tool round(s)",
                    ctx.iteration
                );
                return Ok(ChatOutcome {
                    result: response,
                    messages: ctx.messages,
                    iterations: ctx.iteration,
                });
            }

            let iteration = ctx.iteration;
            log_debug!(
                self.logger,
                "[ToolExecutionLoop] round {}: {} tool call(s)",
                iteration,
                response.tool_calls.len()
            );
            observer.on_tool_calls(iteration, &response.tool_calls);

            let results = execute_batch(
                self.executor.as_ref(),
                &response.tool_calls,
                iteration,
                observer,
                cancel,
            )
            .await;

            for result in results.iter().filter(|r| r.is_error) {
                log_warn!(self.logger, "[ToolExecutionLoop] {} failed: {}", result.name, result.content);
            }

            ctx.record_round(&response, &results);
            observer.on_iteration(iteration, &results);

            if !ctx.has_budget() {
                log_warn!(
                    self.logger,
                    "[ToolExecutionLoop] no final answer after {} rounds",
                    self.max_iterations
                );
                return Err(ProxyError::MaxIterations {
                    max_iterations: self.max_iterations,
                });
            }
        }
    }

    async fn ask(
        &self,
        ctx: &ExecutionContext,
        tools: &[Tool],
        options: &ChatOptions,
        cancel: &CancellationToken,
    ) -> ProxyResult<ChatResult> {
        let call = self.provider.chat(&ctx.messages, tools, options, cancel);
        match cancel.run_until_cancelled(call).await {
            None => Err(ProxyError::Cancelled),
            Some(Err(_)) if cancel.is_cancelled() => Err(ProxyError::Cancelled),
            Some(result) => Ok(result?),
        }
    }
}

impl std::fmt::Debug for ToolExecutionLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolExecutionLoop")
            .field("provider", &self.provider.name())
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}
