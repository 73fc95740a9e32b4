//! Tool catalog and tool calling types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn object_type() -> String {
    "object".to_string()
}

/// JSON Schema describing a tool's arguments.
///
/// Only `properties` and `required` are interpreted; any other schema
/// keywords are carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(rename = "type", default = "object_type")]
    pub schema_type: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for InputSchema {
    fn default() -> Self {
        Self {
            schema_type: object_type(),
            properties: Map::new(),
            required: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl InputSchema {
    pub fn is_required(&self, key: &str) -> bool {
        self.required.iter().any(|r| r == key)
    }

    /// Render as a plain JSON value, the form both LLM wire protocols expect
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

/// A named remote operation exposed by the upstream service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "inputSchema", default)]
    pub input_schema: InputSchema,
}

impl Tool {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: InputSchema::default(),
        }
    }

    /// Add a property to the input schema
    pub fn with_property(mut self, key: impl Into<String>, schema: Value, required: bool) -> Self {
        let key = key.into();
        if required && !self.input_schema.is_required(&key) {
            self.input_schema.required.push(key.clone());
        }
        self.input_schema.properties.insert(key, schema);
        self
    }
}

/// Tool invocation requested by a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned id, echoed back with the result
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Build a call from a JSON value; non-object arguments become an empty map
    pub fn from_value(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(id, name, arguments)
    }

    pub fn get_arg(&self, key: &str) -> Option<&Value> {
        self.arguments.get(key)
    }

    pub fn get_arg_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}

/// Outcome of one tool call, fed back into the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Id of the originating `ToolCall`
    pub id: String,
    pub name: String,
    pub content: String,
    #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(call: &ToolCall, content: impl Into<String>) -> Self {
        Self {
            id: call.id.clone(),
            name: call.name.clone(),
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(call: &ToolCall, message: impl std::fmt::Display) -> Self {
        Self {
            id: call.id.clone(),
            name: call.name.clone(),
            content: format!("Error: {}", message),
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_deserializes_upstream_shape() {
        let tool: Tool = serde_json::from_value(json!({
            "name": "fetch_scripture",
            "description": "Fetch Bible text",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "reference": { "type": "string" },
                    "language": { "type": "string" }
                },
                "required": ["reference"],
                "additionalProperties": false
            }
        }))
        .unwrap();

        assert_eq!(tool.name, "fetch_scripture");
        assert!(tool.input_schema.is_required("reference"));
        assert_eq!(tool.input_schema.properties.len(), 2);
        assert_eq!(tool.input_schema.extra["additionalProperties"], json!(false));
    }

    #[test]
    fn test_tool_without_schema_gets_empty_object_schema() {
        let tool: Tool = serde_json::from_value(json!({ "name": "get_languages" })).unwrap();
        assert_eq!(tool.description, "");
        assert_eq!(tool.input_schema.schema_type, "object");
        assert!(tool.input_schema.properties.is_empty());
    }

    #[test]
    fn test_schema_round_trips_extra_keywords() {
        let tool = Tool::new("t", "d").with_property("a", json!({"type": "string"}), true);
        let value = tool.input_schema.to_value();
        assert_eq!(value["type"], "object");
        assert_eq!(value["required"], json!(["a"]));
    }

    #[test]
    fn test_tool_call_from_non_object_arguments() {
        let call = ToolCall::from_value("c1", "get_languages", Value::Null);
        assert!(call.arguments.is_empty());

        let call = ToolCall::from_value("c2", "fetch_scripture", json!({"reference": "John 3:16"}));
        assert_eq!(call.get_arg_str("reference"), Some("John 3:16"));
    }

    #[test]
    fn test_tool_result_error_prefix() {
        let call = ToolCall::from_value("c1", "fetch_scripture", json!({}));
        let result = ToolResult::error(&call, "upstream returned 404");
        assert!(result.is_error);
        assert_eq!(result.content, "Error: upstream returned 404");
        assert_eq!(result.id, "c1");

        let ok = ToolResult::success(&call, "text");
        assert!(!ok.is_error);
    }
}
