//! Query-string construction for REST endpoints

use serde_json::{Map, Value};

use super::endpoints::Endpoint;

/// RFC 3986 component encoding: unreserved bytes kept, everything else `%XX`
pub fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 3);
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => {
                out.push('%');
                out.push_str(&format!("{b:02X}"));
            }
        }
    }
    out
}

/// Query-string text for an argument value; `None` means omit the parameter
pub fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

/// `key=value&...` for the endpoint's mapped arguments, in table order
pub fn build_query(endpoint: &Endpoint, arguments: &Map<String, Value>) -> String {
    endpoint
        .params
        .iter()
        .filter_map(|(arg, key)| {
            let value = query_value(arguments.get(*arg)?)?;
            Some(format!("{}={}", encode_component(key), encode_component(&value)))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Append a query string to a URL, if it is non-empty
pub fn with_query(url: String, query: &str) -> String {
    if query.is_empty() {
        url
    } else {
        format!("{}?{}", url, query)
    }
}
