//! Tool allow-list and hidden parameters

use serde_json::{Map, Value};

use crate::config::FilterConfig;
use crate::types::{InputSchema, Tool};

/// Apply the allow-list, then strip hidden parameters from every survivor
pub fn filter_tools(tools: &[Tool], config: &FilterConfig) -> Vec<Tool> {
    tools
        .iter()
        .filter(|tool| config.is_tool_enabled(&tool.name))
        .map(|tool| Tool {
            input_schema: filter_schema(&tool.input_schema, config),
            ..tool.clone()
        })
        .collect()
}

/// Remove hidden parameters from both `properties` and `required`
pub fn filter_schema(schema: &InputSchema, config: &FilterConfig) -> InputSchema {
    if !config.has_hidden_params() {
        return schema.clone();
    }

    let mut filtered = schema.clone();
    filtered.properties.retain(|key, _| !config.is_param_hidden(key));
    filtered.required.retain(|key| !config.is_param_hidden(key));
    filtered
}

/// Drop hidden parameters from a call's arguments
pub fn filter_arguments(arguments: &Map<String, Value>, config: &FilterConfig) -> Map<String, Value> {
    arguments
        .iter()
        .filter(|(key, _)| !config.is_param_hidden(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scripture_tool() -> Tool {
        Tool::new("fetch_scripture", "Fetch scripture text")
            .with_property("reference", json!({"type": "string"}), true)
            .with_property("language", json!({"type": "string"}), true)
            .with_property("organization", json!({"type": "string"}), false)
    }

    fn catalog() -> Vec<Tool> {
        vec![
            scripture_tool(),
            Tool::new("get_languages", "List languages"),
            Tool::new("fetch_translation_notes", "Fetch notes"),
        ]
    }

    fn names(tools: &[Tool]) -> Vec<&str> {
        tools.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_no_allow_list_is_identity_on_names() {
        let tools = catalog();
        assert_eq!(names(&filter_tools(&tools, &FilterConfig::new())), names(&tools));

        let empty = FilterConfig::new().with_enabled_tools(Vec::<String>::new());
        assert_eq!(names(&filter_tools(&tools, &empty)), names(&tools));
    }

    #[test]
    fn test_allow_list_keeps_catalog_order() {
        let config = FilterConfig::new().with_enabled_tools(["fetch_translation_notes", "fetch_scripture", "missing"]);
        assert_eq!(
            names(&filter_tools(&catalog(), &config)),
            vec!["fetch_scripture", "fetch_translation_notes"]
        );
    }

    #[test]
    fn test_hidden_params_removed_from_properties_and_required() {
        let config = FilterConfig::new().with_hidden_params(["language", "organization"]);
        let filtered = filter_tools(&[scripture_tool()], &config);
        let schema = &filtered[0].input_schema;

        assert_eq!(schema.properties.keys().collect::<Vec<_>>(), vec!["reference"]);
        assert_eq!(schema.required, vec!["reference".to_string()]);
        assert_eq!(schema.properties["reference"], json!({"type": "string"}));
        assert_eq!(filtered[0].description, "Fetch scripture text");
    }

    #[test]
    fn test_filter_arguments() {
        let config = FilterConfig::new().with_hidden_params(["organization"]);
        let args = json!({"reference": "John 3:16", "organization": "evil-org"});
        let filtered = filter_arguments(args.as_object().unwrap(), &config);

        assert_eq!(Value::Object(filtered), json!({"reference": "John 3:16"}));
    }
}
