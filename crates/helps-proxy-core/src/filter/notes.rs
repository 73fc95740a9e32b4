//! Book- and chapter-level intro note removal

use serde_json::{json, Value};

use crate::config::FilterConfig;
use crate::normalize::passthrough_texts;

/// `front:intro` and any `<chapter>:intro` reference
pub fn is_intro_reference(reference: &str) -> bool {
    reference == "front:intro" || reference.ends_with(":intro")
}

/// Drop intro notes from a notes payload.
///
/// No-op unless enabled. A passthrough payload (`content[0].text` holding
/// JSON) is unwrapped, filtered and re-wrapped as pretty JSON.
/// `metadata.totalCount`, when numeric, is updated to the surviving count.
pub fn filter_book_chapter_notes(payload: Value, config: &FilterConfig) -> Value {
    if !config.filter_book_chapter_notes {
        return payload;
    }

    if let Some(inner) = wrapped_payload(&payload) {
        let filtered = filter_items(inner);
        let text = serde_json::to_string_pretty(&filtered).unwrap_or_else(|_| filtered.to_string());
        let mut rewrapped = payload;
        if let Some(first) = rewrapped.pointer_mut("/content/0") {
            *first = json!({"type": "text", "text": text});
        }
        return rewrapped;
    }

    filter_items(payload)
}

/// JSON object carried in the first text block of a passthrough payload
fn wrapped_payload(payload: &Value) -> Option<Value> {
    let texts = passthrough_texts(payload)?;
    let inner: Value = serde_json::from_str(texts.first()?).ok()?;
    inner.get("items")?.is_array().then_some(inner)
}

fn filter_items(mut payload: Value) -> Value {
    let Some(items) = payload.get_mut("items").and_then(Value::as_array_mut) else {
        return payload;
    };

    items.retain(|item| {
        !item
            .get("Reference")
            .and_then(Value::as_str)
            .is_some_and(is_intro_reference)
    });
    let count = items.len();

    if let Some(total) = payload.pointer_mut("/metadata/totalCount") {
        if total.is_number() {
            *total = json!(count);
        }
    }
    payload
}
