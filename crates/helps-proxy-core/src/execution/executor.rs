//! Tool execution seam and batch fan-out

use async_trait::async_trait;
use futures::future::join_all;

use super::hooks::LoopObserver;
use crate::error::ProxyResult;
use crate::types::{CancellationToken, CanonicalContent, ToolCall, ToolResult};

/// Runs one tool call end to end
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, call: &ToolCall, cancel: &CancellationToken) -> ProxyResult<CanonicalContent>;
}

/// Run every call concurrently and wait for all of them.
///
/// Results come back in request order. A failing call becomes an error
/// result for that call only.
pub async fn execute_batch(
    executor: &dyn ToolExecutor,
    calls: &[ToolCall],
    iteration: usize,
    observer: &dyn LoopObserver,
    cancel: &CancellationToken,
) -> Vec<ToolResult> {
    let pending = calls.iter().map(|call| async move {
        let result = match executor.execute(call, cancel).await {
            Ok(content) => ToolResult::success(call, content.joined_text()),
            Err(err) => ToolResult::error(call, err),
        };
        observer.on_tool_result(iteration, &result);
        result
    });
    join_all(pending).await
}
