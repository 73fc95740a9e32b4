//! Core types shared by the router, normalizer, providers and tool loop

mod cancellation;
mod chat;
mod content;
mod message;
mod tool;

pub use cancellation::CancellationToken;
pub use chat::{ChatResult, FinishReason, Usage};
pub use content::{CanonicalContent, ContentBlock};
pub use message::{ChatMessage, MessageRole};
pub use tool::{InputSchema, Tool, ToolCall, ToolResult};
