//! Logging abstractions
//!
//! Components never reach for a global logger; each receives an
//! `Arc<dyn Logger>` when it is built.

mod noop;
mod subscriber;
mod tracing_logger;
mod traits;

pub use noop::NoOpLogger;
pub use subscriber::init_tracing;
pub use tracing_logger::TracingLogger;
pub use traits::{LogLevel, Logger, LoggerExt, SharedLogger};
