//! Tracing setup.

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. Logs go to
/// stderr so command output on stdout stays clean.
pub fn init_tracing(configured_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
