//! Tool execution loop
//!
//! Alternates provider turns with concurrent tool execution until the model
//! stops asking for tools or the iteration budget runs out.

mod context;
mod executor;
mod hooks;
mod tool_loop;

pub use context::ExecutionContext;
pub use executor::{execute_batch, ToolExecutor};
pub use hooks::{FnObserver, LoopObserver, NoopObserver};
pub use tool_loop::{ChatOutcome, ToolExecutionLoop};
