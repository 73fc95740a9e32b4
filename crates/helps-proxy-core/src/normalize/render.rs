//! Pure renderers, one per response shape

use serde_json::Value;

use super::shape::{section_items, AggregateShape, ResponseShape};
use crate::types::{CanonicalContent, ContentBlock};

pub const NO_SCRIPTURE: &str = "No scripture text found";
pub const NO_NOTES: &str = "No translation notes found";
pub const NO_QUESTIONS: &str = "No translation questions found";
pub const NO_WORDS: &str = "No translation words found";

impl ResponseShape<'_> {
    pub fn render(&self) -> CanonicalContent {
        match self {
            ResponseShape::Passthrough(texts) => {
                CanonicalContent::new(texts.iter().map(|t| ContentBlock::text(*t)).collect())
            }
            ResponseShape::Aggregate(shape) => CanonicalContent::from_text(render_aggregate(shape)),
            ResponseShape::Scripture(entries) => CanonicalContent::from_text(render_scripture(entries)),
            ResponseShape::Questions(items) => CanonicalContent::from_text(render_questions(items)),
            ResponseShape::Words(items) => CanonicalContent::from_text(render_words(items)),
            ResponseShape::Notes(items) => CanonicalContent::from_text(render_notes(items)),
            ResponseShape::Result(value) => CanonicalContent::from_text(render_value(value)),
            ResponseShape::Raw(value) => CanonicalContent::from_text(render_value(value)),
        }
    }
}

/// Strings verbatim, everything else pretty-printed JSON
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => pretty(other),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// First present, non-null field among `keys`, as text
fn field(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .find(|value| !value.is_null())
        .map(render_value)
}

fn join_entries(entries: Vec<String>, empty_message: &str) -> String {
    if entries.is_empty() {
        empty_message.to_string()
    } else {
        entries.join("\n\n")
    }
}

pub fn render_scripture(entries: &[Value]) -> String {
    let rendered = entries
        .iter()
        .map(|entry| {
            let text = match entry {
                Value::String(s) => s.clone(),
                _ => field(entry, &["text"]).unwrap_or_else(|| pretty(entry)),
            };
            match entry.get("translation").and_then(Value::as_str) {
                Some(translation) => format!("{} ({})", text, translation),
                None => text,
            }
        })
        .collect();
    join_entries(rendered, NO_SCRIPTURE)
}

pub fn render_questions(items: &[Value]) -> String {
    let rendered = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let question = field(item, &["question", "Question"]).unwrap_or_default();
            let answer = field(item, &["Response", "Answer", "answer"]).unwrap_or_default();
            format!("Q{}: {}\nA: {}", i + 1, question, answer)
        })
        .collect();
    join_entries(rendered, NO_QUESTIONS)
}

pub fn render_words(items: &[Value]) -> String {
    let rendered = items
        .iter()
        .map(|item| {
            let term = field(item, &["term", "name"]).unwrap_or_default();
            let definition = field(item, &["definition", "content"]).unwrap_or_default();
            format!("**{}**\n{}", term, definition)
        })
        .collect();
    join_entries(rendered, NO_WORDS)
}

pub fn render_notes(items: &[Value]) -> String {
    let rendered = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let content = match item {
                Value::String(s) => s.clone(),
                _ => field(item, &["Note", "note", "text", "content"]).unwrap_or_else(|| pretty(item)),
            };
            format!("{}. {}", i + 1, content)
        })
        .collect();
    join_entries(rendered, NO_NOTES)
}

fn render_section(value: &Value, render_items: fn(&[Value]) -> String) -> String {
    match section_items(value) {
        Some(items) => render_items(items),
        None => render_value(value),
    }
}

fn render_aggregate(shape: &AggregateShape<'_>) -> String {
    let mut sections = Vec::new();

    if let Some(scripture) = shape.scripture {
        let body = match scripture {
            Value::Array(entries) => render_scripture(entries),
            Value::Object(_) => field(scripture, &["text"]).unwrap_or_else(|| pretty(scripture)),
            other => render_value(other),
        };
        sections.push(format!("## Scripture\n\n{}", body));
    }
    if let Some(notes) = shape.notes {
        sections.push(format!("## Translation Notes\n\n{}", render_section(notes, render_notes)));
    }
    if let Some(words) = shape.words {
        sections.push(format!("## Translation Words\n\n{}", render_section(words, render_words)));
    }
    if let Some(questions) = shape.questions {
        sections.push(format!(
            "## Translation Questions\n\n{}",
            render_section(questions, render_questions)
        ));
    }

    sections.join("\n\n")
}
