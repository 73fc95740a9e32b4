//! Structural classification of upstream payloads

use serde_json::Value;

/// Shape variants, without their data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Passthrough,
    Aggregate,
    Scripture,
    Questions,
    Words,
    Notes,
    Result,
    Raw,
}

/// Order in which shapes are tried; the first match wins
pub const SHAPE_PRIORITY: [ShapeKind; 8] = [
    ShapeKind::Passthrough,
    ShapeKind::Aggregate,
    ShapeKind::Scripture,
    ShapeKind::Questions,
    ShapeKind::Words,
    ShapeKind::Notes,
    ShapeKind::Result,
    ShapeKind::Raw,
];

/// Sections of a context-style payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateShape<'a> {
    pub scripture: Option<&'a Value>,
    pub notes: Option<&'a Value>,
    pub words: Option<&'a Value>,
    pub questions: Option<&'a Value>,
}

/// A classified payload, borrowing from the original JSON
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape<'a> {
    /// Already canonical: the texts of a `content` array of text blocks
    Passthrough(Vec<&'a str>),
    Aggregate(AggregateShape<'a>),
    Scripture(&'a [Value]),
    Questions(&'a [Value]),
    Words(&'a [Value]),
    Notes(&'a [Value]),
    Result(&'a Value),
    Raw(&'a Value),
}

impl<'a> ResponseShape<'a> {
    pub fn classify(payload: &'a Value) -> Self {
        SHAPE_PRIORITY
            .iter()
            .find_map(|kind| Self::try_match(*kind, payload))
            .unwrap_or(ResponseShape::Raw(payload))
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            ResponseShape::Passthrough(_) => ShapeKind::Passthrough,
            ResponseShape::Aggregate(_) => ShapeKind::Aggregate,
            ResponseShape::Scripture(_) => ShapeKind::Scripture,
            ResponseShape::Questions(_) => ShapeKind::Questions,
            ResponseShape::Words(_) => ShapeKind::Words,
            ResponseShape::Notes(_) => ShapeKind::Notes,
            ResponseShape::Result(_) => ShapeKind::Result,
            ResponseShape::Raw(_) => ShapeKind::Raw,
        }
    }

    fn try_match(kind: ShapeKind, payload: &'a Value) -> Option<Self> {
        match kind {
            ShapeKind::Passthrough => passthrough_texts(payload).map(ResponseShape::Passthrough),
            ShapeKind::Aggregate => aggregate(payload).map(ResponseShape::Aggregate),
            ShapeKind::Scripture => payload
                .get("scripture")
                .and_then(Value::as_array)
                .map(|entries| ResponseShape::Scripture(entries.as_slice())),
            ShapeKind::Questions | ShapeKind::Words | ShapeKind::Notes => {
                let items = payload.get("items")?.as_array()?;
                (item_kind(payload, items) == kind).then(|| items_shape(kind, items))
            }
            ShapeKind::Result => payload.get("result").map(ResponseShape::Result),
            ShapeKind::Raw => Some(ResponseShape::Raw(payload)),
        }
    }
}

/// Texts of a non-empty `content` array made only of text blocks
pub(crate) fn passthrough_texts(payload: &Value) -> Option<Vec<&str>> {
    let blocks = payload.get("content")?.as_array()?;
    if blocks.is_empty() {
        return None;
    }
    blocks
        .iter()
        .map(|block| match block.get("type").and_then(Value::as_str) {
            Some("text") => block.get("text").and_then(Value::as_str),
            _ => None,
        })
        .collect()
}

fn aggregate(payload: &Value) -> Option<AggregateShape<'_>> {
    let shape = AggregateShape {
        scripture: payload.get("scripture"),
        notes: payload.get("translationNotes"),
        words: payload.get("translationWords"),
        questions: payload.get("translationQuestions"),
    };
    (shape.notes.is_some() || shape.words.is_some() || shape.questions.is_some()).then_some(shape)
}

fn items_shape(kind: ShapeKind, items: &[Value]) -> ResponseShape<'_> {
    match kind {
        ShapeKind::Questions => ResponseShape::Questions(items),
        ShapeKind::Words => ResponseShape::Words(items),
        _ => ResponseShape::Notes(items),
    }
}

/// Questions, words or notes, decided by the first item's fields
fn item_kind(payload: &Value, items: &[Value]) -> ShapeKind {
    let Some(first) = items.first() else {
        return empty_items_kind(payload);
    };

    let has = |key: &str| first.get(key).is_some();
    if has("question") || has("Question") {
        ShapeKind::Questions
    } else if has("term") || has("definition") {
        ShapeKind::Words
    } else {
        ShapeKind::Notes
    }
}

/// An empty list has no item to inspect; fall back to resource-type hints
fn empty_items_kind(payload: &Value) -> ShapeKind {
    let hint = payload
        .pointer("/metadata/resourceType")
        .or_else(|| payload.get("resourceType"))
        .and_then(Value::as_str)
        .map(str::to_lowercase)
        .unwrap_or_default();

    if hint.contains("question") {
        ShapeKind::Questions
    } else if hint.contains("word") {
        ShapeKind::Words
    } else {
        ShapeKind::Notes
    }
}

/// Items of a section value: the array itself or an object's `items` array
pub(crate) fn section_items(value: &Value) -> Option<&[Value]> {
    match value {
        Value::Array(items) => Some(items.as_slice()),
        Value::Object(map) => map.get("items").and_then(Value::as_array).map(Vec::as_slice),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kind_of(payload: Value) -> ShapeKind {
        ResponseShape::classify(&payload).kind()
    }

    #[test]
    fn test_priority_list_is_complete_and_ordered() {
        assert_eq!(SHAPE_PRIORITY.first(), Some(&ShapeKind::Passthrough));
        assert_eq!(SHAPE_PRIORITY.last(), Some(&ShapeKind::Raw));
        let unique: std::collections::HashSet<_> = SHAPE_PRIORITY.iter().collect();
        assert_eq!(unique.len(), SHAPE_PRIORITY.len());
    }

    #[test]
    fn test_classification() {
        assert_eq!(kind_of(json!({"content": [{"type": "text", "text": "hi"}]})), ShapeKind::Passthrough);
        assert_eq!(kind_of(json!({"translationWords": []})), ShapeKind::Aggregate);
        assert_eq!(kind_of(json!({"scripture": [{"text": "x"}]})), ShapeKind::Scripture);
        assert_eq!(kind_of(json!({"items": [{"Question": "q"}]})), ShapeKind::Questions);
        assert_eq!(kind_of(json!({"items": [{"term": "grace"}]})), ShapeKind::Words);
        assert_eq!(kind_of(json!({"items": [{"Note": "n"}]})), ShapeKind::Notes);
        assert_eq!(kind_of(json!({"result": "ok"})), ShapeKind::Result);
        assert_eq!(kind_of(json!({"something": "else"})), ShapeKind::Raw);
        assert_eq!(kind_of(json!([1, 2])), ShapeKind::Raw);
    }

    #[test]
    fn test_first_match_wins() {
        // scripture + notes is a context payload, not plain scripture
        assert_eq!(
            kind_of(json!({"scripture": [], "translationNotes": []})),
            ShapeKind::Aggregate
        );
        // items outranks result
        assert_eq!(kind_of(json!({"items": [{"Note": "n"}], "result": "x"})), ShapeKind::Notes);
    }

    #[test]
    fn test_mixed_content_is_not_passthrough() {
        assert_eq!(
            kind_of(json!({"content": [{"type": "text", "text": "a"}, {"type": "image", "data": ""}]})),
            ShapeKind::Raw
        );
        assert_eq!(kind_of(json!({"content": []})), ShapeKind::Raw);
    }

    #[test]
    fn test_empty_items_use_resource_hints() {
        assert_eq!(
            kind_of(json!({"items": [], "metadata": {"resourceType": "tq"}})),
            ShapeKind::Notes
        );
        assert_eq!(
            kind_of(json!({"items": [], "metadata": {"resourceType": "translation-questions"}})),
            ShapeKind::Questions
        );
        assert_eq!(kind_of(json!({"items": [], "resourceType": "words"})), ShapeKind::Words);
        assert_eq!(kind_of(json!({"items": []})), ShapeKind::Notes);
    }

    #[test]
    fn test_section_items() {
        assert_eq!(section_items(&json!([1])).map(<[Value]>::len), Some(1));
        assert_eq!(section_items(&json!({"items": [1, 2]})).map(<[Value]>::len), Some(2));
        assert!(section_items(&json!("text")).is_none());
    }
}
