//! Observation hooks
//!
//! Hooks are side effects only; nothing they do reaches the loop's control
//! flow or its result.

use crate::types::{ToolCall, ToolResult};

pub trait LoopObserver: Send + Sync {
    /// Before a batch of calls is executed
    fn on_tool_calls(&self, _iteration: usize, _calls: &[ToolCall]) {}

    /// After each individual result, in completion order
    fn on_tool_result(&self, _iteration: usize, _result: &ToolResult) {}

    /// After a full round, results in request order
    fn on_iteration(&self, _iteration: usize, _results: &[ToolResult]) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl LoopObserver for NoopObserver {}

type CallsHook = Box<dyn Fn(usize, &[ToolCall]) + Send + Sync>;
type ResultHook = Box<dyn Fn(usize, &ToolResult) + Send + Sync>;
type IterationHook = Box<dyn Fn(usize, &[ToolResult]) + Send + Sync>;

/// Closure-backed observer
///
/// ```
/// use helps_proxy_core::execution::FnObserver;
///
/// let observer = FnObserver::new()
///     .with_tool_result(|iteration, result| println!("{iteration}: {}", result.name));
/// ```
#[derive(Default)]
pub struct FnObserver {
    tool_calls: Option<CallsHook>,
    tool_result: Option<ResultHook>,
    iteration: Option<IterationHook>,
}

impl FnObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool_calls(mut self, f: impl Fn(usize, &[ToolCall]) + Send + Sync + 'static) -> Self {
        self.tool_calls = Some(Box::new(f));
        self
    }

    pub fn with_tool_result(mut self, f: impl Fn(usize, &ToolResult) + Send + Sync + 'static) -> Self {
        self.tool_result = Some(Box::new(f));
        self
    }

    pub fn with_iteration(mut self, f: impl Fn(usize, &[ToolResult]) + Send + Sync + 'static) -> Self {
        self.iteration = Some(Box::new(f));
        self
    }
}

impl LoopObserver for FnObserver {
    fn on_tool_calls(&self, iteration: usize, calls: &[ToolCall]) {
        if let Some(f) = &self.tool_calls {
            f(iteration, calls);
        }
    }

    fn on_tool_result(&self, iteration: usize, result: &ToolResult) {
        if let Some(f) = &self.tool_result {
            f(iteration, result);
        }
    }

    fn on_iteration(&self, iteration: usize, results: &[ToolResult]) {
        if let Some(f) = &self.iteration {
            f(iteration, results);
        }
    }
}

impl std::fmt::Debug for FnObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnObserver")
            .field("tool_calls", &self.tool_calls.is_some())
            .field("tool_result", &self.tool_result.is_some())
            .field("iteration", &self.iteration.is_some())
            .finish()
    }
}
