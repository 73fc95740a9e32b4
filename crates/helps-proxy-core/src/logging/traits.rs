//! Logger capability

use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logging capability handed to every component at construction.
///
/// Implementations:
/// - `NoOpLogger`: silent, for tests
/// - `TracingLogger`: forwards to the `tracing` crate
/// - front-ends may supply their own (e.g. a stdio server that must keep stdout clean)
///
/// Only [`Logger::log`] is required.
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);

    /// Whether a message at `level` would be kept; lets callers skip formatting
    fn enabled(&self, _level: LogLevel) -> bool {
        true
    }

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

pub type SharedLogger = Arc<dyn Logger>;

/// Formatting entry point used by the `log_*!` macros
pub trait LoggerExt: Logger {
    fn log_fmt(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if self.enabled(level) {
            self.log(level, &args.to_string());
        }
    }
}

impl<T: Logger + ?Sized> LoggerExt for T {}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $crate::logging::LoggerExt::log_fmt(&*$logger, $crate::logging::LogLevel::Debug, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $crate::logging::LoggerExt::log_fmt(&*$logger, $crate::logging::LogLevel::Info, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $crate::logging::LoggerExt::log_fmt(&*$logger, $crate::logging::LogLevel::Warn, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $crate::logging::LoggerExt::log_fmt(&*$logger, $crate::logging::LogLevel::Error, format_args!($($arg)*))
    };
}
