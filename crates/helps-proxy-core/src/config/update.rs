//! Partial configuration updates applied at runtime

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use super::settings::ProxyConfig;

/// A partial update to the runtime-adjustable settings.
///
/// `None` leaves a setting untouched. For `enabled_tools` and
/// `hidden_params`, `Some(empty)` clears the setting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_tools: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_params: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_book_chapter_notes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_temperature: Option<f32>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled_tools = Some(tools.into_iter().map(Into::into).collect());
        self
    }

    pub fn hidden_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden_params = Some(params.into_iter().map(Into::into).collect());
        self
    }

    pub fn filter_book_chapter_notes(mut self, enabled: bool) -> Self {
        self.filter_book_chapter_notes = Some(enabled);
        self
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn llm_model(mut self, model: impl Into<String>) -> Self {
        self.llm_model = Some(model.into());
        self
    }

    pub fn llm_temperature(mut self, temperature: f32) -> Self {
        self.llm_temperature = Some(temperature);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether applying this update requires rebuilding the chat provider
    pub fn touches_llm(&self) -> bool {
        self.llm_model.is_some() || self.llm_temperature.is_some()
    }

    /// Apply to a copy of `current` and validate the result.
    ///
    /// `current` is never modified; on error the caller keeps the old config.
    pub fn apply_to(&self, current: &ProxyConfig) -> ConfigResult<ProxyConfig> {
        let mut next = current.clone();

        if let Some(tools) = &self.enabled_tools {
            next.filters.enabled_tools = (!tools.is_empty()).then(|| tools.clone());
        }
        if let Some(params) = &self.hidden_params {
            next.filters.hidden_params = (!params.is_empty()).then(|| params.clone());
        }
        if let Some(flag) = self.filter_book_chapter_notes {
            next.filters.filter_book_chapter_notes = flag;
        }
        if let Some(max) = self.max_iterations {
            next.max_iterations = max;
        }

        if self.touches_llm() {
            let llm = next.llm.as_mut().ok_or_else(|| {
                ConfigError::invalid("llm", "no LLM provider is configured")
            })?;
            if let Some(model) = &self.llm_model {
                llm.model = model.clone();
            }
            if let Some(temperature) = self.llm_temperature {
                llm.temperature = Some(temperature);
            }
        }

        next.validate()?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FilterConfig, LlmConfig, ProviderKind};

    #[test]
    fn test_apply_filters() {
        let current = ProxyConfig::default();
        let update = ConfigUpdate::new()
            .enabled_tools(["fetch_scripture"])
            .hidden_params(["language"])
            .filter_book_chapter_notes(true);

        let next = update.apply_to(&current).unwrap();
        assert!(next.filters.is_tool_enabled("fetch_scripture"));
        assert!(!next.filters.is_tool_enabled("get_languages"));
        assert!(next.filters.is_param_hidden("language"));
        assert!(next.filters.filter_book_chapter_notes);
        assert_eq!(current, ProxyConfig::default());
    }

    #[test]
    fn test_empty_set_clears_allow_list() {
        let current = ProxyConfig::default()
            .with_filters(FilterConfig::new().with_enabled_tools(["fetch_scripture"]));
        let next = ConfigUpdate::new()
            .enabled_tools(Vec::<String>::new())
            .apply_to(&current)
            .unwrap();
        assert!(next.filters.enabled_tools.is_none());
    }

    #[test]
    fn test_invalid_update_is_rejected() {
        let current = ProxyConfig::default();
        assert!(ConfigUpdate::new().max_iterations(0).apply_to(&current).is_err());
    }

    #[test]
    fn test_llm_update_requires_llm() {
        let update = ConfigUpdate::new().llm_model("gpt-4o");
        assert!(update.touches_llm());
        assert!(update.apply_to(&ProxyConfig::default()).is_err());

        let current = ProxyConfig::default().with_llm(LlmConfig::new(ProviderKind::OpenAi, "gpt-4o-mini"));
        let next = update.llm_temperature(0.2).apply_to(&current).unwrap();
        let llm = next.llm.unwrap();
        assert_eq!(llm.model, "gpt-4o");
        assert_eq!(llm.temperature, Some(0.2));
    }

    #[test]
    fn test_deserialize_partial() {
        let update: ConfigUpdate =
            serde_json::from_str(r#"{"hiddenParams":["organization"],"maxIterations":2}"#).unwrap();
        assert_eq!(update.max_iterations, Some(2));
        assert!(update.enabled_tools.is_none());
        assert!(!ConfigUpdate::new().max_iterations(1).is_empty());
        assert!(ConfigUpdate::new().is_empty());
    }
}
