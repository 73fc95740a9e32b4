//! State owned by a single loop run

use crate::types::{ChatMessage, ChatResult, ToolResult};

#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Completed tool rounds
    pub iteration: usize,
    pub max_iterations: usize,
    pub messages: Vec<ChatMessage>,
}

impl ExecutionContext {
    pub fn new(messages: Vec<ChatMessage>, max_iterations: usize) -> Self {
        Self {
            iteration: 0,
            max_iterations,
            messages,
        }
    }

    pub fn has_budget(&self) -> bool {
        self.iteration < self.max_iterations
    }

    /// Append the requesting assistant turn and one message per result,
    /// then count the round.
    pub fn record_round(&mut self, response: &ChatResult, results: &[ToolResult]) {
        let assistant = &response.message;
        if !assistant.content.is_empty() || !response.tool_calls.is_empty() {
            let mut turn = assistant.clone();
            if turn.tool_calls.is_empty() {
                turn.tool_calls = response.tool_calls.clone();
            }
            self.messages.push(turn);
        }
        self.messages.extend(results.iter().map(ChatMessage::tool_result));
        self.iteration += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MessageRole, ToolCall};
    use serde_json::Map;

    #[test]
    fn test_record_round() {
        let call = ToolCall::new("c1", "get_languages", Map::new());
        let response = ChatResult::with_tool_calls("", vec![call.clone()]);
        let mut ctx = ExecutionContext::new(vec![ChatMessage::user("hi")], 2);

        ctx.record_round(&response, &[ToolResult::success(&call, "en, fr")]);

        assert_eq!(ctx.iteration, 1);
        assert!(ctx.has_budget());
        assert_eq!(ctx.messages.len(), 3);
        assert_eq!(ctx.messages[1].role, MessageRole::Assistant);
        assert_eq!(ctx.messages[1].tool_calls[0].id, "c1");
        assert_eq!(ctx.messages[2].role, MessageRole::Tool);
        assert_eq!(ctx.messages[2].tool_call_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_budget_exhausted() {
        let mut ctx = ExecutionContext::new(Vec::new(), 1);
        ctx.record_round(&ChatResult::text(""), &[]);
        assert!(!ctx.has_budget());
        // empty assistant turn without tool calls is not appended
        assert!(ctx.messages.is_empty());
    }
}
