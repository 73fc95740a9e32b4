//! Silent logger

use std::sync::Arc;

use super::traits::{LogLevel, Logger, SharedLogger};

/// Drops every message. Reports every level as disabled, so the `log_*!`
/// macros skip formatting entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl NoOpLogger {
    pub fn new() -> Self {
        Self
    }

    /// Shared handle, ready to pass into constructors
    pub fn shared() -> SharedLogger {
        Arc::new(Self)
    }
}

impl Logger for NoOpLogger {
    fn log(&self, _level: LogLevel, _message: &str) {}

    fn enabled(&self, _level: LogLevel) -> bool {
        false
    }
}
