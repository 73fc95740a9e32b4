//! Response normalization
//!
//! Every upstream payload is reduced to [`CanonicalContent`] in two steps:
//! [`ResponseShape::classify`] picks exactly one shape (trying
//! [`SHAPE_PRIORITY`] in order), then that shape's renderer produces the
//! text. Both steps are pure and total.

mod render;
mod shape;

use serde_json::Value;

use crate::types::CanonicalContent;

pub use render::{render_value, NO_NOTES, NO_QUESTIONS, NO_SCRIPTURE, NO_WORDS};
pub use shape::{AggregateShape, ResponseShape, ShapeKind, SHAPE_PRIORITY};

pub(crate) use shape::passthrough_texts;

/// Normalize any JSON payload into canonical text blocks.
///
/// Never fails and never returns an empty sequence.
pub fn normalize(payload: &Value) -> CanonicalContent {
    ResponseShape::classify(payload).render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn texts(content: &CanonicalContent) -> Vec<&str> {
        content.blocks().iter().map(|b| b.as_text()).collect()
    }

    #[test]
    fn test_scripture_with_translation_suffix() {
        let content = normalize(&json!({
            "scripture": [
                {"text": "In the beginning", "translation": "KJV"},
                {"text": "God created"}
            ]
        }));
        assert_eq!(texts(&content), vec!["In the beginning (KJV)\n\nGod created"]);
    }

    #[test]
    fn test_passthrough_keeps_blocks() {
        let content = normalize(&json!({
            "content": [{"type": "text", "text": "one"}, {"type": "text", "text": "two"}]
        }));
        assert_eq!(texts(&content), vec!["one", "two"]);
    }

    #[test]
    fn test_items_preserve_upstream_order() {
        let content = normalize(&json!({"items": [{"Note": "b"}, {"Note": "a"}]}));
        assert_eq!(texts(&content), vec!["1. b\n\n2. a"]);
    }

    #[test]
    fn test_empty_items_message() {
        let content = normalize(&json!({"items": [], "metadata": {"resourceType": "questions"}}));
        assert_eq!(texts(&content), vec![NO_QUESTIONS]);
        assert_eq!(texts(&normalize(&json!({"scripture": []}))), vec![NO_SCRIPTURE]);
    }

    #[test]
    fn test_result_field() {
        assert_eq!(texts(&normalize(&json!({"result": "plain"}))), vec!["plain"]);
        assert_eq!(
            texts(&normalize(&json!({"result": {"count": 2}}))),
            vec!["{\n  \"count\": 2\n}"]
        );
    }

    #[test]
    fn test_total_over_odd_payloads() {
        for payload in [json!({}), json!([]), json!(null), json!(42), json!("s"), json!({"items": "nope"})] {
            assert!(!normalize(&payload).is_empty(), "empty output for {payload}");
        }
    }
}
