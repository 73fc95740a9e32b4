//! Logger that forwards to the `tracing` crate

use tracing::Level;

use super::traits::{LogLevel, Logger};

/// Emits every message as a `tracing` event under the `helps_proxy` target.
///
/// The `component` field lets subscribers filter by source without parsing
/// the bracketed tags embedded in messages.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    component: String,
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl TracingLogger {
    pub fn new() -> Self {
        Self {
            component: "helps-proxy".to_string(),
        }
    }

    /// Create a logger with a custom component name
    pub fn with_component(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        let component = self.component.as_str();
        match level {
            LogLevel::Debug => tracing::debug!(target: "helps_proxy", component, "{}", message),
            LogLevel::Info => tracing::info!(target: "helps_proxy", component, "{}", message),
            LogLevel::Warn => tracing::warn!(target: "helps_proxy", component, "{}", message),
            LogLevel::Error => tracing::error!(target: "helps_proxy", component, "{}", message),
        }
    }

    fn enabled(&self, level: LogLevel) -> bool {
        match level {
            LogLevel::Debug => tracing::enabled!(target: "helps_proxy", Level::DEBUG),
            LogLevel::Info => tracing::enabled!(target: "helps_proxy", Level::INFO),
            LogLevel::Warn => tracing::enabled!(target: "helps_proxy", Level::WARN),
            LogLevel::Error => tracing::enabled!(target: "helps_proxy", Level::ERROR),
        }
    }
}
