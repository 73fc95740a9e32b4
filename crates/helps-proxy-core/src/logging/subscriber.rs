//! Subscriber installation for front-ends

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber writing to stderr.
///
/// `filter` is an `EnvFilter` directive such as `"helps_proxy=debug"`. When it
/// is `None`, `RUST_LOG` is consulted, then `info`. Stdout is left untouched so
/// a stdio tool server can own it.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(filter: Option<&str>) -> bool {
    let env_filter = match filter {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}
