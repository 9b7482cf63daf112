//! Logging configuration using tracing
//!
//! Structured logging to stderr, filtered through RUST_LOG.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber
///
/// Filtering follows RUST_LOG and defaults to "warn" so CLI output stays
/// clean. Auth tokens and API keys are never recorded as fields.
///
/// # Example RUST_LOG values
/// - `RUST_LOG=info` - one line per create, update, delete and login
/// - `RUST_LOG=currencycloud=debug` - every request path and page summary
/// - `RUST_LOG=currencycloud=debug,reqwest=debug` - include connection details
///
/// # Errors
/// Returns an error if a subscriber has already been installed
pub fn init() -> crate::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .try_init()
        .map_err(|e| crate::Error::Other(format!("Failed to initialize tracing: {}", e)))?;

    Ok(())
}

/// Initialize logging for tests (no-op if already initialized)
pub fn init_test() {
    let _ = init();
}
