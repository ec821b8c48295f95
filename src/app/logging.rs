//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber. RUST_LOG overrides the CLI filter.
pub fn init_tracing(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}
